//! Resolver abstraction trait
//!
//! This module defines the `UrlResolver` trait that all storage backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Resolver operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid object path: {0}")]
    InvalidKey(String),

    #[error("Invalid expiry: {0}")]
    InvalidExpiry(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object has no download token: {0}")]
    MissingDownloadToken(String),

    #[error("URL signing failed: {0}")]
    SigningFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for resolver operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Turns an object path into a URL a generic HTTP client can fetch.
///
/// Access intent is always read-only. `expires_at` is the instant after which
/// the URL may stop working; backends that publish permanent URLs ignore it
/// beyond rejecting instants already in the past.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    /// Resolve `path` (relative to the bucket) into a read URL valid until `expires_at`.
    async fn resolve_read_url(
        &self,
        path: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
