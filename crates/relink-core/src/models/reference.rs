//! Legacy storage references (`gs://bucket/path`) and their path derivation.

use thiserror::Error;

/// Scheme prefix identifying a legacy, non-fetchable storage reference.
pub const LEGACY_SCHEME: &str = "gs://";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("reference {reference} is outside bucket root {bucket_root}")]
    ForeignBucket {
        reference: String,
        bucket_root: String,
    },

    #[error("reference {0} has an empty object path")]
    EmptyPath(String),
}

/// A field value recognized by the legacy scheme prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyReference<'a> {
    raw: &'a str,
}

impl<'a> LegacyReference<'a> {
    /// Returns `Some` only when `value` starts with [`LEGACY_SCHEME`].
    pub fn detect(value: &'a str) -> Option<Self> {
        value
            .starts_with(LEGACY_SCHEME)
            .then_some(LegacyReference { raw: value })
    }

    /// Strip `bucket_root` (normalized `gs://<bucket>/`) and return the object path.
    pub fn relative_path(&self, bucket_root: &str) -> Result<&'a str, ReferenceError> {
        let path = self
            .raw
            .strip_prefix(bucket_root)
            .ok_or_else(|| ReferenceError::ForeignBucket {
                reference: self.raw.to_string(),
                bucket_root: bucket_root.to_string(),
            })?;

        if path.is_empty() {
            return Err(ReferenceError::EmptyPath(self.raw.to_string()));
        }

        Ok(path)
    }
}

/// Normalize a bucket name or root into `gs://<bucket>/`.
///
/// Accepts `bucket`, `gs://bucket` and `gs://bucket/`.
pub fn normalize_bucket_root(bucket: &str) -> String {
    let name = bucket
        .trim()
        .trim_start_matches(LEGACY_SCHEME)
        .trim_end_matches('/');
    format!("{}{}/", LEGACY_SCHEME, name)
}
