//! Configuration module
//!
//! Configuration for the document store, the storage resolver and the sweep,
//! loaded from the environment (after `.env`) and validated before use.

use std::env;

use chrono::{DateTime, TimeZone, Utc};

use crate::models::normalize_bucket_root;
use crate::storage_types::{DocumentStoreKind, StorageBackend};

const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_COLLECTION: &str = "books";
const DEFAULT_FIELD: &str = "imageUrl";

/// Expiry used when none is configured: far enough out to never matter.
pub fn default_url_expiry() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2500, 3, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Document store connection settings.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub kind: DocumentStoreKind,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

/// Object storage resolver settings.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    pub local_base_url: Option<String>,
}

/// Settings handed to the migration sweep at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepConfig {
    /// Normalized `gs://<bucket>/` prefix stripped from legacy references.
    pub bucket_root: String,
    pub collection_name: String,
    pub field_name: String,
    pub url_expiry: DateTime<Utc>,
}

impl SweepConfig {
    pub fn new(
        bucket: &str,
        collection_name: impl Into<String>,
        field_name: impl Into<String>,
        url_expiry: DateTime<Utc>,
    ) -> Self {
        Self {
            bucket_root: normalize_bucket_root(bucket),
            collection_name: collection_name.into(),
            field_name: field_name.into(),
            url_expiry,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.bucket_root == normalize_bucket_root("") {
            return Err(anyhow::anyhow!("Bucket root must name a bucket"));
        }
        if self.collection_name.trim().is_empty() {
            return Err(anyhow::anyhow!("SWEEP_COLLECTION must not be empty"));
        }
        if self.field_name.trim().is_empty() {
            return Err(anyhow::anyhow!("SWEEP_FIELD must not be empty"));
        }
        Ok(())
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub sweep: SweepConfig,
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. `from_env` delegates here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind = lookup("DOCUMENT_STORE")
            .map(|s| s.parse::<DocumentStoreKind>())
            .transpose()?
            .unwrap_or(DocumentStoreKind::Postgres);

        let database = DatabaseConfig {
            kind,
            database_url: lookup("DATABASE_URL"),
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
        };

        let backend = lookup("STORAGE_BACKEND")
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::Firebase);

        let bucket = lookup("STORAGE_BUCKET")
            .ok_or_else(|| anyhow::anyhow!("STORAGE_BUCKET must be set"))?;

        let storage = StorageConfig {
            backend,
            bucket: bucket.clone(),
            s3_region: lookup("S3_REGION").or_else(|| lookup("AWS_REGION")),
            s3_endpoint: lookup("S3_ENDPOINT"),
            local_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
        };

        let url_expiry = match lookup("SWEEP_URL_EXPIRY") {
            Some(s) => parse_expiry(&s)?,
            None => default_url_expiry(),
        };

        let sweep = SweepConfig::new(
            &bucket,
            lookup("SWEEP_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            lookup("SWEEP_FIELD").unwrap_or_else(|| DEFAULT_FIELD.to_string()),
            url_expiry,
        );

        Ok(Config {
            database,
            storage,
            sweep,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.validate_at(Utc::now())
    }

    /// Validate as of `now`; the URL expiry is checked against the backend's lifetime limit.
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), anyhow::Error> {
        if self.database.kind == DocumentStoreKind::Postgres {
            match self.database.database_url.as_deref() {
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set for the postgres document store"
                    ))
                }
                Some(url)
                    if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) =>
                {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                Some(_) => {}
            }
        }

        if self.storage.bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_BUCKET must not be empty"));
        }

        if self.storage.backend == StorageBackend::Local && self.storage.local_base_url.is_none() {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=local requires LOCAL_STORAGE_BASE_URL to be set"
            ));
        }

        if self.storage.backend == StorageBackend::S3 && self.storage.s3_region.is_none() {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=s3 requires S3_REGION or AWS_REGION to be set"
            ));
        }

        if self.sweep.url_expiry <= now {
            return Err(anyhow::anyhow!(
                "SWEEP_URL_EXPIRY {} is not in the future",
                self.sweep.url_expiry.to_rfc3339()
            ));
        }

        if let Some(max) = self.storage.backend.max_url_lifetime() {
            let lifetime = (self.sweep.url_expiry - now).to_std().unwrap_or_default();
            if lifetime > max {
                return Err(anyhow::anyhow!(
                    "SWEEP_URL_EXPIRY {} exceeds the {} signed URL limit of {} seconds; \
                     use STORAGE_BACKEND=firebase for non-expiring URLs",
                    self.sweep.url_expiry.to_rfc3339(),
                    self.storage.backend,
                    max.as_secs()
                ));
            }
        }

        self.sweep.validate()
    }

    // Convenience getters
    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.backend
    }

    pub fn document_store(&self) -> DocumentStoreKind {
        self.database.kind
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database.database_url.as_deref()
    }
}

/// Parse an RFC 3339 instant or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_expiry(value: &str) -> Result<DateTime<Utc>, anyhow::Error> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        anyhow::anyhow!(
            "Invalid expiry '{}': expected RFC 3339 instant or YYYY-MM-DD",
            value
        )
    })?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| anyhow::anyhow!("Invalid expiry '{}'", value))
}
