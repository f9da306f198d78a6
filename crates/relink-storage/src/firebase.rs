//! Firebase download URLs.
//!
//! A Firebase Storage object carries one or more download tokens in its
//! `firebaseStorageDownloadTokens` metadata. A URL built from a token stays
//! valid until the token is revoked, so these URLs do not expire.

use crate::keys::{lifetime_until, validate_object_path};
use crate::traits::{StorageError, StorageResult, UrlResolver};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path;
use object_store::{Attribute, Error as ObjectStoreError, GetOptions, ObjectStore};

/// Object metadata key holding comma-separated download tokens.
pub const DOWNLOAD_TOKENS_METADATA: &str = "firebaseStorageDownloadTokens";

const FIREBASE_ENDPOINT: &str = "https://firebasestorage.googleapis.com/v0/b";

/// Reads the download tokens attached to an object.
#[async_trait]
pub trait DownloadTokenSource: Send + Sync {
    /// Raw metadata value, `None` when the object has no tokens.
    async fn download_tokens(&self, path: &str) -> StorageResult<Option<String>>;
}

#[async_trait]
impl DownloadTokenSource for GoogleCloudStorage {
    async fn download_tokens(&self, path: &str) -> StorageResult<Option<String>> {
        let location = Path::from(path);
        let mut options = GetOptions::default();
        options.head = true;

        let result = self.get_opts(&location, options).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(path.to_string()),
            other => StorageError::BackendError(other.to_string()),
        })?;

        // Header-derived metadata keys arrive lowercased.
        let tokens = result.attributes.iter().find_map(|(key, value)| match key {
            Attribute::Metadata(name) if name.eq_ignore_ascii_case(DOWNLOAD_TOKENS_METADATA) => {
                Some(AsRef::<str>::as_ref(value).to_string())
            }
            _ => None,
        });
        Ok(tokens)
    }
}

/// Resolver producing non-expiring Firebase download URLs.
#[derive(Debug, Clone)]
pub struct FirebaseResolver<T> {
    tokens: T,
    bucket: String,
}

impl<T: DownloadTokenSource> FirebaseResolver<T> {
    pub fn new(tokens: T, bucket: String) -> Self {
        Self { tokens, bucket }
    }
}

impl FirebaseResolver<GoogleCloudStorage> {
    /// Create a resolver for `bucket`. Credentials come from the environment
    /// (`GOOGLE_SERVICE_ACCOUNT`, `GOOGLE_APPLICATION_CREDENTIALS`, ...).
    pub fn from_env(bucket: String) -> StorageResult<Self> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        Ok(Self::new(store, bucket))
    }
}

/// Build the download URL for `path` with `token`.
pub fn download_url(bucket: &str, path: &str, token: &str) -> String {
    format!(
        "{}/{}/o/{}?alt=media&token={}",
        FIREBASE_ENDPOINT,
        urlencoding::encode(bucket),
        urlencoding::encode(path),
        urlencoding::encode(token)
    )
}

#[async_trait]
impl<T: DownloadTokenSource> UrlResolver for FirebaseResolver<T> {
    async fn resolve_read_url(
        &self,
        path: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<String> {
        validate_object_path(path)?;
        lifetime_until(expires_at, Utc::now(), None)?;
        let start = std::time::Instant::now();

        let raw = self.tokens.download_tokens(path).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                path = %path,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Download token lookup failed"
            );
            e
        })?;

        let token = raw
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
            .ok_or_else(|| StorageError::MissingDownloadToken(path.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            path = %path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Download URL issued"
        );

        Ok(download_url(&self.bucket, path, token))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Firebase
    }
}
