//! Postgres document store: one JSONB row per document in `documents`.

use async_trait::async_trait;
use relink_core::{AppError, Record};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};

use crate::store::DocumentStore;

/// Row type for documents table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: String,
    pub data: Json<Value>,
}

impl DocumentRow {
    pub fn into_record(self) -> Record {
        Record::from_value(self.id, self.data.0)
    }
}

/// Repository for the documents table.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace a whole document. Used to seed collections.
    #[tracing::instrument(skip(self, data), fields(db.table = "documents"))]
    pub async fn upsert(&self, collection: &str, id: &str, data: Value) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(data))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[tracing::instrument(skip(self), fields(db.table = "documents"))]
    async fn list_records(&self, collection: &str) -> Result<Vec<Record>, AppError> {
        let rows: Vec<DocumentRow> = sqlx::query_as::<Postgres, DocumentRow>(
            "SELECT id, data FROM documents WHERE collection = $1 ORDER BY id",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DocumentRow::into_record).collect())
    }

    #[tracing::instrument(skip(self, value), fields(db.table = "documents", db.record_id = %id))]
    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = jsonb_set(data, ARRAY[$3]::text[], to_jsonb($4::text), true),
                updated_at = now()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(value)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{}/{}", collection, id)));
        }
        Ok(())
    }
}
