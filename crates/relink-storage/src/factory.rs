#[cfg(feature = "storage-firebase")]
use crate::FirebaseResolver;
#[cfg(feature = "storage-local")]
use crate::LocalResolver;
#[cfg(any(feature = "storage-gcs", feature = "storage-s3"))]
use crate::SignedUrlResolver;
use crate::{StorageBackend, StorageError, StorageResult, UrlResolver};
use relink_core::Config;
use std::sync::Arc;

/// Create a URL resolver based on configuration
pub fn create_resolver(config: &Config) -> StorageResult<Arc<dyn UrlResolver>> {
    let storage = &config.storage;

    match storage.backend {
        #[cfg(feature = "storage-firebase")]
        StorageBackend::Firebase => {
            let resolver = FirebaseResolver::from_env(storage.bucket.clone())?;
            Ok(Arc::new(resolver))
        }

        #[cfg(not(feature = "storage-firebase"))]
        StorageBackend::Firebase => Err(StorageError::ConfigError(
            "Firebase resolver not available (storage-firebase feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-gcs")]
        StorageBackend::Gcs => {
            let resolver = SignedUrlResolver::gcs(storage.bucket.clone())?;
            Ok(Arc::new(resolver))
        }

        #[cfg(not(feature = "storage-gcs"))]
        StorageBackend::Gcs => Err(StorageError::ConfigError(
            "GCS resolver not available (storage-gcs feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let region = storage.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let resolver = SignedUrlResolver::s3(
                storage.bucket.clone(),
                region,
                storage.s3_endpoint.clone(),
            )?;
            Ok(Arc::new(resolver))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 resolver not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_url = storage.local_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;
            Ok(Arc::new(LocalResolver::new(base_url)?))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local resolver not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn builds_local_resolver() {
        let config = config(&[
            ("STORAGE_BUCKET", "covers"),
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:3000/media"),
        ]);
        let resolver = create_resolver(&config).unwrap();
        assert_eq!(resolver.backend_type(), StorageBackend::Local);
    }

    #[test]
    fn local_without_base_url_fails() {
        let config = config(&[("STORAGE_BUCKET", "covers"), ("STORAGE_BACKEND", "local")]);
        assert!(matches!(
            create_resolver(&config),
            Err(StorageError::ConfigError(_))
        ));
    }
}
