//! Relink Storage Library
//!
//! This crate turns bucket-relative object paths into fetchable URLs.
//! It includes the `UrlResolver` trait and implementations backed by Firebase
//! download tokens, by signed URLs (GCS, S3) and by a plain public base URL
//! (local).
//!
//! # Object paths
//!
//! Paths are relative to the configured bucket (`covers/dune.png`, never
//! `gs://bucket/covers/dune.png`). They must not be empty, contain `..` or
//! start with `/`. Validation is centralized in the `keys` module.

pub mod factory;
#[cfg(feature = "storage-firebase")]
pub mod firebase;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(any(feature = "storage-gcs", feature = "storage-s3"))]
pub mod signed;
pub mod traits;

// Re-export commonly used types
pub use factory::create_resolver;
#[cfg(feature = "storage-firebase")]
pub use firebase::{DownloadTokenSource, FirebaseResolver};
#[cfg(feature = "storage-local")]
pub use local::LocalResolver;
pub use relink_core::StorageBackend;
#[cfg(any(feature = "storage-gcs", feature = "storage-s3"))]
pub use signed::SignedUrlResolver;
pub use traits::{StorageError, StorageResult, UrlResolver};
