//! Signed URL resolvers backed by `object_store` signers (GCS and S3).

use crate::keys::{lifetime_until, validate_object_path};
use crate::traits::{StorageError, StorageResult, UrlResolver};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::Method;
use object_store::path::Path;
use object_store::signer::Signer;

#[cfg(feature = "storage-s3")]
use object_store::aws::{AmazonS3, AmazonS3Builder};
#[cfg(feature = "storage-gcs")]
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};

/// Resolver that issues read-only (GET) signed URLs.
///
/// Signed URLs live at most `StorageBackend::max_url_lifetime`; expiries beyond
/// that are rejected with `InvalidExpiry` instead of being shortened.
#[derive(Debug, Clone)]
pub struct SignedUrlResolver<S> {
    signer: S,
    backend: StorageBackend,
    bucket: String,
}

impl<S: Signer> SignedUrlResolver<S> {
    pub fn new(signer: S, backend: StorageBackend, bucket: String) -> Self {
        Self {
            signer,
            backend,
            bucket,
        }
    }
}

#[cfg(feature = "storage-gcs")]
impl SignedUrlResolver<GoogleCloudStorage> {
    /// Create a GCS resolver. Credentials come from the environment
    /// (`GOOGLE_SERVICE_ACCOUNT`, `GOOGLE_APPLICATION_CREDENTIALS`, ...).
    pub fn gcs(bucket: String) -> StorageResult<Self> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::new(store, StorageBackend::Gcs, bucket))
    }
}

#[cfg(feature = "storage-s3")]
impl SignedUrlResolver<AmazonS3> {
    /// Create an S3 resolver
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    pub fn s3(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());
        Self::s3_from_builder(builder, bucket, endpoint_url)
    }

    pub(crate) fn s3_from_builder(
        mut builder: AmazonS3Builder,
        bucket: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::new(store, StorageBackend::S3, bucket))
    }
}

#[async_trait]
impl<S: Signer> UrlResolver for SignedUrlResolver<S> {
    async fn resolve_read_url(
        &self,
        path: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<String> {
        validate_object_path(path)?;
        let expires_in =
            lifetime_until(expires_at, Utc::now(), self.backend.max_url_lifetime())?;
        let location = Path::from(path);
        let start = std::time::Instant::now();

        let url = self
            .signer
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    backend = %self.backend,
                    bucket = %self.bucket,
                    path = %path,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "URL signing failed"
                );
                StorageError::SigningFailed(e.to_string())
            })?;

        tracing::debug!(
            backend = %self.backend,
            bucket = %self.bucket,
            path = %path,
            expires_in_secs = expires_in.as_secs(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Signed read URL issued"
        );

        Ok(url.to_string())
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
