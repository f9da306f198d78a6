use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use relink_core::{Config, DocumentStoreKind};
use relink_db::{setup_database, DocumentStore, InMemoryDocumentStore, PgDocumentStore};
use relink_services::{RecordOutcome, SweepError, SweepReport};

/// Exit status when every examined record was handled.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status when the sweep aborted or any record failed.
pub const EXIT_SWEEP_FAILED: u8 = 1;
/// Exit status for configuration and setup errors.
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Map a finished sweep to the process exit status.
pub fn exit_code_for(result: &Result<SweepReport, SweepError>) -> u8 {
    match result {
        Ok(report) if report.is_success() => EXIT_SUCCESS,
        Ok(_) | Err(_) => EXIT_SWEEP_FAILED,
    }
}

/// One line per record that was not skipped.
pub fn summary_lines(report: &SweepReport, max_url_len: usize) -> Vec<String> {
    let mut lines: Vec<String> = report
        .records
        .iter()
        .filter_map(|record| match &record.outcome {
            RecordOutcome::Fixed { url } => Some(format!(
                "fixed      {}  {}",
                record.id,
                truncate_string(url, max_url_len)
            )),
            RecordOutcome::WouldFix { path } => {
                Some(format!("would fix  {}  {}", record.id, path))
            }
            RecordOutcome::Failed { reason } => {
                Some(format!("failed     {}  {}", record.id, reason))
            }
            RecordOutcome::Skipped { .. } => None,
        })
        .collect();

    lines.push(format!(
        "{}: examined {}, fixed {}, would fix {}, skipped {}, failed {}",
        report.collection,
        report.examined,
        report.fixed,
        report.pending,
        report.skipped,
        report.failed
    ));
    lines
}

/// Build the document store selected by `DOCUMENT_STORE`.
///
/// When `seed` points at a JSON file of the form `{ "<id>": { ...document... } }`,
/// its documents are written into the sweep collection first (replacing
/// documents with the same id).
pub async fn build_store(
    config: &Config,
    seed: Option<&Path>,
) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let collection = config.sweep.collection_name.as_str();
    let documents = match seed {
        Some(path) => read_seed(path).await?,
        None => serde_json::Map::new(),
    };
    let count = documents.len();

    let store: Arc<dyn DocumentStore> = match config.document_store() {
        DocumentStoreKind::Postgres => {
            let pool = setup_database(&config.database).await?;
            let store = PgDocumentStore::new(pool);
            for (id, data) in documents {
                store
                    .upsert(collection, &id, data)
                    .await
                    .with_context(|| format!("Failed to seed document {}", id))?;
            }
            Arc::new(store)
        }
        DocumentStoreKind::Memory => {
            let store = InMemoryDocumentStore::new();
            for (id, data) in documents {
                store.insert(collection, &id, data).await;
            }
            Arc::new(store)
        }
    };

    if seed.is_some() {
        tracing::info!(count, collection = %collection, "Document store seeded");
    }
    Ok(store)
}

async fn read_seed(path: &Path) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Seed file {} must be a JSON object", path.display()))
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
