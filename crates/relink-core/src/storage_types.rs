use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

/// Longest lifetime V4 / SigV4 signed URLs accept.
pub const MAX_SIGNED_URL_LIFETIME: Duration = Duration::from_secs(7 * 24 * 3600);

/// Object storage backends that can resolve a bucket-relative path into a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Firebase download-token URLs on a GCS bucket. These never expire.
    Firebase,
    Gcs,
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "firebase" => Ok(StorageBackend::Firebase),
            "gcs" | "gs" => Ok(StorageBackend::Gcs),
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Firebase => write!(f, "firebase"),
            StorageBackend::Gcs => write!(f, "gcs"),
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

impl StorageBackend {
    /// Longest URL lifetime the backend can issue, `None` when URLs never expire.
    pub fn max_url_lifetime(&self) -> Option<Duration> {
        match self {
            StorageBackend::Gcs | StorageBackend::S3 => Some(MAX_SIGNED_URL_LIFETIME),
            StorageBackend::Firebase | StorageBackend::Local => None,
        }
    }
}

/// Document store backends holding the records to migrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStoreKind {
    Postgres,
    Memory,
}

impl FromStr for DocumentStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DocumentStoreKind::Postgres),
            "memory" => Ok(DocumentStoreKind::Memory),
            _ => Err(anyhow::anyhow!("Invalid document store: {}", s)),
        }
    }
}

impl Display for DocumentStoreKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DocumentStoreKind::Postgres => write!(f, "postgres"),
            DocumentStoreKind::Memory => write!(f, "memory"),
        }
    }
}
