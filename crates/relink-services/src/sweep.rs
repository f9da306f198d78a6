//! Migration sweep
//!
//! One pass over a collection: every record whose reference field carries a
//! legacy `gs://` value gets that value replaced by a resolved URL. Records are
//! handled one at a time, in snapshot order.

use std::sync::Arc;

use relink_core::{AppError, LegacyReference, Record, ReferenceError, SweepConfig};
use relink_db::DocumentStore;
use relink_storage::{StorageError, UrlResolver};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("failed to snapshot collection {collection}")]
    Snapshot {
        collection: String,
        #[source]
        source: AppError,
    },

    #[error("failed to resolve URL for record {id}")]
    Resolve {
        id: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to update record {id}")]
    Update {
        id: String,
        #[source]
        source: AppError,
    },

    #[error("record {id} has an invalid legacy reference")]
    InvalidReference {
        id: String,
        #[source]
        source: ReferenceError,
    },
}

/// What to do when a single record cannot be migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure. Records already fixed stay fixed.
    #[default]
    Abort,
    /// Record the failure and move on to the next record.
    Continue,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SweepOptions {
    pub policy: FailurePolicy,
    /// Report matching records without resolving or writing anything.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Field missing, null or not a string.
    Absent,
    /// Field holds a value outside the legacy scheme.
    NotLegacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Fixed { url: String },
    WouldFix { path: String },
    Skipped { reason: SkipReason },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordReport {
    pub id: String,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub collection: String,
    pub dry_run: bool,
    pub examined: usize,
    pub fixed: usize,
    pub pending: usize,
    pub skipped: usize,
    pub failed: usize,
    pub records: Vec<RecordReport>,
}

impl SweepReport {
    /// True when no record failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn push(&mut self, id: String, outcome: RecordOutcome) {
        self.examined += 1;
        match outcome {
            RecordOutcome::Fixed { .. } => self.fixed += 1,
            RecordOutcome::WouldFix { .. } => self.pending += 1,
            RecordOutcome::Skipped { .. } => self.skipped += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
        }
        self.records.push(RecordReport { id, outcome });
    }
}

pub struct Sweep {
    config: SweepConfig,
    store: Arc<dyn DocumentStore>,
    resolver: Arc<dyn UrlResolver>,
    options: SweepOptions,
}

impl Sweep {
    pub fn new(
        config: SweepConfig,
        store: Arc<dyn DocumentStore>,
        resolver: Arc<dyn UrlResolver>,
    ) -> Self {
        Self {
            config,
            store,
            resolver,
            options: SweepOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SweepOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the sweep to completion.
    ///
    /// Under `FailurePolicy::Abort` the first per-record error is returned and
    /// later records are left untouched. A snapshot failure is always returned.
    #[tracing::instrument(skip(self), fields(collection = %self.config.collection_name, dry_run = self.options.dry_run))]
    pub async fn run(&self) -> Result<SweepReport, SweepError> {
        let collection = &self.config.collection_name;
        let start = std::time::Instant::now();

        let records =
            self.store
                .list_records(collection)
                .await
                .map_err(|source| SweepError::Snapshot {
                    collection: collection.clone(),
                    source,
                })?;

        tracing::info!(count = records.len(), "Collection snapshot loaded");

        let mut report = SweepReport {
            collection: collection.clone(),
            dry_run: self.options.dry_run,
            ..SweepReport::default()
        };

        for record in &records {
            let outcome = match self.migrate_record(record).await {
                Ok(outcome) => outcome,
                Err(e) if self.options.policy == FailurePolicy::Continue => {
                    tracing::warn!(record_id = %record.id, error = %e, "Record migration failed, continuing");
                    RecordOutcome::Failed {
                        reason: error_chain(&e),
                    }
                }
                Err(e) => {
                    tracing::error!(
                        record_id = %record.id,
                        examined = report.examined,
                        fixed = report.fixed,
                        error = %e,
                        "Sweep aborted"
                    );
                    return Err(e);
                }
            };
            report.push(record.id.clone(), outcome);
        }

        tracing::info!(
            examined = report.examined,
            fixed = report.fixed,
            pending = report.pending,
            skipped = report.skipped,
            failed = report.failed,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Done!"
        );

        Ok(report)
    }

    async fn migrate_record(&self, record: &Record) -> Result<RecordOutcome, SweepError> {
        let Some(value) = record.string_field(&self.config.field_name) else {
            tracing::info!(record_id = %record.id, "No reference, skipping");
            return Ok(RecordOutcome::Skipped {
                reason: SkipReason::Absent,
            });
        };

        let Some(reference) = LegacyReference::detect(value) else {
            tracing::info!(record_id = %record.id, "Reference already resolved, skipping");
            return Ok(RecordOutcome::Skipped {
                reason: SkipReason::NotLegacy,
            });
        };

        let path = reference
            .relative_path(&self.config.bucket_root)
            .map_err(|source| SweepError::InvalidReference {
                id: record.id.clone(),
                source,
            })?;

        if self.options.dry_run {
            tracing::info!(record_id = %record.id, path = %path, "Would fix record");
            return Ok(RecordOutcome::WouldFix {
                path: path.to_string(),
            });
        }

        tracing::info!(record_id = %record.id, path = %path, "Fixing record");

        let url = self
            .resolver
            .resolve_read_url(path, self.config.url_expiry)
            .await
            .map_err(|source| SweepError::Resolve {
                id: record.id.clone(),
                source,
            })?;

        self.store
            .update_field(
                &self.config.collection_name,
                &record.id,
                &self.config.field_name,
                &url,
            )
            .await
            .map_err(|source| SweepError::Update {
                id: record.id.clone(),
                source,
            })?;

        tracing::info!(record_id = %record.id, url = %url, "Fixed");

        Ok(RecordOutcome::Fixed { url })
    }
}

/// Render an error and its sources as one line.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_chain_includes_sources() {
        let err = SweepError::InvalidReference {
            id: "b1".to_string(),
            source: ReferenceError::EmptyPath("gs://bucket-X/".to_string()),
        };
        assert_eq!(
            error_chain(&err),
            "record b1 has an invalid legacy reference: reference gs://bucket-X/ has an empty object path"
        );
    }

    #[test]
    fn report_counts_follow_outcomes() {
        let mut report = SweepReport::default();
        report.push("a".into(), RecordOutcome::Fixed { url: "u".into() });
        report.push(
            "b".into(),
            RecordOutcome::Skipped {
                reason: SkipReason::Absent,
            },
        );
        report.push("c".into(), RecordOutcome::Failed { reason: "x".into() });

        assert_eq!(report.examined, 3);
        assert_eq!(report.fixed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.is_success());
    }
}
