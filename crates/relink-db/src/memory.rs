//! In-memory document store.
//!
//! Keeps collections in ordered maps and records every field update, so tests
//! can assert exactly which writes a sweep issued.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use relink_core::{AppError, Record};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::store::DocumentStore;

/// One `update_field` call as received by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub collection: String,
    pub id: String,
    pub field: String,
    pub value: String,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<String, Map<String, Value>>>,
    updates: Vec<FieldUpdate>,
}

#[derive(Default)]
pub struct InMemoryDocumentStore {
    inner: Mutex<Inner>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document. Non-object values are stored as empty documents.
    pub async fn insert(&self, collection: &str, id: &str, data: Value) {
        let record = Record::from_value(id, data);
        let mut inner = self.inner.lock().await;
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(record.id, record.fields);
    }

    pub async fn get(&self, collection: &str, id: &str) -> Option<Record> {
        let inner = self.inner.lock().await;
        inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Record::new(id, fields.clone()))
    }

    /// All updates applied so far, in call order.
    pub async fn updates(&self) -> Vec<FieldUpdate> {
        self.inner.lock().await.updates.clone()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_records(&self, collection: &str) -> Result<Vec<Record>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Record::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        let fields = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", collection, id)))?;
        fields.insert(field.to_string(), Value::String(value.to_string()));

        inner.updates.push(FieldUpdate {
            collection: collection.to_string(),
            id: id.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn lists_records_in_id_order() {
        let store = InMemoryDocumentStore::new();
        store.insert("books", "b2", json!({ "title": "Emma" })).await;
        store.insert("books", "b1", json!({ "title": "Dune" })).await;
        store.insert("authors", "a1", json!({})).await;

        let ids: Vec<String> = store
            .list_records("books")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b1", "b2"]);
        assert!(store.list_records("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_field_touches_only_that_field() {
        let store = InMemoryDocumentStore::new();
        store
            .insert("books", "b1", json!({ "title": "Dune", "imageUrl": "gs://x/a.png" }))
            .await;

        store
            .update_field("books", "b1", "imageUrl", "https://cdn/a.png")
            .await
            .unwrap();

        let record = store.get("books", "b1").await.unwrap();
        assert_eq!(record.string_field("imageUrl"), Some("https://cdn/a.png"));
        assert_eq!(record.string_field("title"), Some("Dune"));
        assert_eq!(store.updates().await.len(), 1);
    }

    #[tokio::test]
    async fn update_of_unknown_record_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = store
            .update_field("books", "nope", "imageUrl", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.updates().await.is_empty());
    }
}
