use crate::keys::{lifetime_until, validate_object_path};
use crate::traits::{StorageError, StorageResult, UrlResolver};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Resolver for publicly readable buckets served from a fixed base URL.
///
/// URLs never expire; `expires_at` is only checked to be in the future.
#[derive(Debug, Clone)]
pub struct LocalResolver {
    base_url: String,
}

impl LocalResolver {
    /// Create a new LocalResolver
    ///
    /// # Arguments
    /// * `base_url` - Base URL for serving objects (e.g., "http://localhost:3000/media")
    pub fn new(base_url: String) -> StorageResult<Self> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(StorageError::ConfigError(format!(
                "Local base URL must be http(s): {}",
                base_url
            )));
        }
        Ok(LocalResolver { base_url })
    }

    /// Generate public URL for an object path, percent-encoding each segment
    fn generate_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.base_url.trim_end_matches('/'), encoded.join("/"))
    }
}

#[async_trait]
impl UrlResolver for LocalResolver {
    async fn resolve_read_url(
        &self,
        path: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<String> {
        validate_object_path(path)?;
        lifetime_until(expires_at, Utc::now(), None)?;
        Ok(self.generate_url(path))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn resolves_against_base_url() {
        let resolver = LocalResolver::new("http://localhost:3000/media/".to_string()).unwrap();
        let url = resolver
            .resolve_read_url("a/b/c.png", Utc::now() + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:3000/media/a/b/c.png");
    }

    #[tokio::test]
    async fn encodes_path_segments() {
        let resolver = LocalResolver::new("https://cdn.example.com".to_string()).unwrap();
        let url = resolver
            .resolve_read_url("covers/the hobbit#1.png", Utc::now() + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/covers/the%20hobbit%231.png");
    }

    #[tokio::test]
    async fn rejects_past_expiry_and_bad_paths() {
        let resolver = LocalResolver::new("https://cdn.example.com".to_string()).unwrap();
        assert!(matches!(
            resolver
                .resolve_read_url("a.png", Utc::now() - Duration::days(1))
                .await,
            Err(StorageError::InvalidExpiry(_))
        ));
        assert!(matches!(
            resolver.resolve_read_url("", Utc::now() + Duration::days(1)).await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn base_url_must_be_http() {
        assert!(LocalResolver::new("ftp://example.com".to_string()).is_err());
    }
}
