//! Relink Core Library
//!
//! This crate provides the domain models, error types and configuration shared
//! by the storage resolvers, the document stores and the migration sweep.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, SweepConfig};
pub use error::AppError;
pub use models::{normalize_bucket_root, LegacyReference, Record, ReferenceError, LEGACY_SCHEME};
pub use storage_types::{DocumentStoreKind, StorageBackend};
