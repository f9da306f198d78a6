//! Test doubles for the sweep collaborators.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use relink_core::{AppError, Record, StorageBackend, SweepConfig};
use relink_db::{DocumentStore, InMemoryDocumentStore};
use relink_storage::{StorageError, StorageResult, UrlResolver};
use serde_json::json;

pub const BUCKET: &str = "bucket-X";
pub const COLLECTION: &str = "books";
pub const FIELD: &str = "imageUrl";

pub fn expiry() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2500, 3, 1, 0, 0, 0).unwrap()
}

pub fn sweep_config() -> SweepConfig {
    SweepConfig::new(BUCKET, COLLECTION, FIELD, expiry())
}

/// URL the recording resolver returns for `path`.
pub fn resolved(path: &str) -> String {
    format!("https://storage.example.com/{}/{}?sig=test", BUCKET, path)
}

/// Resolver that records every call and fails on chosen call numbers (1-based).
#[derive(Default)]
pub struct RecordingResolver {
    calls: Mutex<Vec<(String, DateTime<Utc>)>>,
    fail_on: HashSet<usize>,
}

impl RecordingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: calls.iter().copied().collect(),
        }
    }

    pub fn calls(&self) -> Vec<(String, DateTime<Utc>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|(path, _)| path).collect()
    }
}

#[async_trait]
impl UrlResolver for RecordingResolver {
    async fn resolve_read_url(
        &self,
        path: &str,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<String> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((path.to_string(), expires_at));
            calls.len()
        };
        if self.fail_on.contains(&call) {
            return Err(StorageError::SigningFailed(format!("quota exceeded for {}", path)));
        }
        Ok(resolved(path))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Gcs
    }
}

/// Store whose snapshot always fails.
pub struct UnreachableStore;

#[async_trait]
impl DocumentStore for UnreachableStore {
    async fn list_records(&self, _collection: &str) -> Result<Vec<Record>, AppError> {
        Err(AppError::Internal("connection refused".to_string()))
    }

    async fn update_field(
        &self,
        _collection: &str,
        _id: &str,
        _field: &str,
        _value: &str,
    ) -> Result<(), AppError> {
        Err(AppError::Internal("connection refused".to_string()))
    }
}

/// Store that snapshots normally but refuses writes to chosen records.
pub struct FailingUpdateStore {
    pub inner: Arc<InMemoryDocumentStore>,
    fail_ids: HashSet<String>,
}

impl FailingUpdateStore {
    pub fn new(inner: Arc<InMemoryDocumentStore>, fail_ids: &[&str]) -> Self {
        Self {
            inner,
            fail_ids: fail_ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[async_trait]
impl DocumentStore for FailingUpdateStore {
    async fn list_records(&self, collection: &str) -> Result<Vec<Record>, AppError> {
        self.inner.list_records(collection).await
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), AppError> {
        if self.fail_ids.contains(id) {
            return Err(AppError::Internal(format!("permission denied for {}", id)));
        }
        self.inner.update_field(collection, id, field, value).await
    }
}

/// The three-record collection: one legacy reference, one resolved URL, one without a reference.
pub async fn three_record_store() -> Arc<InMemoryDocumentStore> {
    let store = Arc::new(InMemoryDocumentStore::new());
    store
        .insert(
            COLLECTION,
            "b1",
            json!({ "title": "Dune", FIELD: "gs://bucket-X/covers/dune.png" }),
        )
        .await;
    store
        .insert(
            COLLECTION,
            "b2",
            json!({ "title": "Emma", FIELD: "https://cdn.example.com/emma.png" }),
        )
        .await;
    store
        .insert(COLLECTION, "b3", json!({ "title": "Ulysses" }))
        .await;
    store
}

/// Three records, all carrying legacy references.
pub async fn all_legacy_store() -> Arc<InMemoryDocumentStore> {
    let store = Arc::new(InMemoryDocumentStore::new());
    for (id, path) in [("b1", "a.png"), ("b2", "b.png"), ("b3", "c.png")] {
        store
            .insert(
                COLLECTION,
                id,
                json!({ FIELD: format!("gs://{}/{}", BUCKET, path) }),
            )
            .await;
    }
    store
}
