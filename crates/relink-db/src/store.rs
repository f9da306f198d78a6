use async_trait::async_trait;
use relink_core::{AppError, Record};

/// Document store collaborator used by the migration sweep.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Snapshot every record of `collection`, ordered by id.
    async fn list_records(&self, collection: &str) -> Result<Vec<Record>, AppError>;

    /// Overwrite `field` of record `id` with a string value, leaving other fields alone.
    ///
    /// Returns `AppError::NotFound` when the record does not exist.
    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), AppError>;
}
