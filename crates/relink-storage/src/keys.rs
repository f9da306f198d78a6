//! Shared object path and lifetime checks for resolver backends.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::traits::{StorageError, StorageResult};

/// Validate a bucket-relative object path.
pub fn validate_object_path(path: &str) -> StorageResult<()> {
    if path.is_empty() {
        return Err(StorageError::InvalidKey("object path is empty".to_string()));
    }
    if path.starts_with('/') || path.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "object path contains invalid segments: {}",
            path
        )));
    }
    Ok(())
}

/// Lifetime from `now` until `expires_at`.
///
/// Fails when `expires_at` is not in the future or lies beyond `max_lifetime`.
/// Lifetimes are never shortened.
pub fn lifetime_until(
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
    max_lifetime: Option<Duration>,
) -> StorageResult<Duration> {
    let lifetime = (expires_at - now)
        .to_std()
        .ok()
        .filter(|lifetime| !lifetime.is_zero())
        .ok_or_else(|| {
            StorageError::InvalidExpiry(format!(
                "{} is not in the future",
                expires_at.to_rfc3339()
            ))
        })?;

    match max_lifetime {
        Some(max) if lifetime > max => Err(StorageError::InvalidExpiry(format!(
            "{} is {} seconds away, beyond the backend limit of {} seconds",
            expires_at.to_rfc3339(),
            lifetime.as_secs(),
            max.as_secs()
        ))),
        _ => Ok(lifetime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_traversal_and_absolute_paths() {
        assert!(validate_object_path("covers/dune.png").is_ok());
        assert!(validate_object_path("covers/..hidden.png").is_ok());
        assert!(validate_object_path("").is_err());
        assert!(validate_object_path("/covers/dune.png").is_err());
        assert!(validate_object_path("covers/../secrets").is_err());
    }

    #[test]
    fn lifetime_beyond_limit_is_rejected_not_capped() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let far = Utc.with_ymd_and_hms(2500, 3, 1, 0, 0, 0).unwrap();
        let week = Duration::from_secs(7 * 24 * 3600);

        assert!(matches!(
            lifetime_until(far, now, Some(week)),
            Err(StorageError::InvalidExpiry(_))
        ));
        assert!(lifetime_until(far, now, None).unwrap() > week);

        let in_a_day = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(
            lifetime_until(in_a_day, now, Some(week)).unwrap(),
            Duration::from_secs(24 * 3600)
        );
    }

    #[test]
    fn past_expiry_is_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let past = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            lifetime_until(past, now, None),
            Err(StorageError::InvalidExpiry(_))
        ));
        assert!(lifetime_until(now, now, None).is_err());
    }
}
