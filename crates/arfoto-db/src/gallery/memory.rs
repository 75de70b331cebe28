use arfoto_core::{GalleryRecord, NewGalleryRecord};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{validate_collection, DocumentStoreError, DocumentStoreResult};
use crate::store::DocumentStore;

/// In-memory document store
///
/// Also serves as the test double: `fail_inserts_with` makes every insert fail.
#[derive(Default)]
pub struct MemoryDocumentStore {
    records: Mutex<Vec<(String, GalleryRecord)>>,
    insert_failure: Mutex<Option<String>>,
    insert_attempts: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, Vec<(String, GalleryRecord)>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn fail_inserts_with(&self, reason: impl Into<String>) {
        *self
            .insert_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(reason.into());
    }

    /// All records of a collection in insertion order.
    pub fn records_in(&self, collection: &str) -> Vec<GalleryRecord> {
        self.records()
            .iter()
            .filter(|(c, _)| c == collection)
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Number of `insert` calls, including failed ones.
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(
        &self,
        collection: &str,
        record: NewGalleryRecord,
    ) -> DocumentStoreResult<GalleryRecord> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        validate_collection(collection)?;

        if let Some(reason) = self
            .insert_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
        {
            return Err(DocumentStoreError::Unavailable(reason));
        }

        let record = record.into_record(Uuid::new_v4(), Utc::now());
        self.records()
            .push((collection.to_string(), record.clone()));
        Ok(record)
    }

    async fn list(&self, collection: &str, limit: usize) -> DocumentStoreResult<Vec<GalleryRecord>> {
        validate_collection(collection)?;
        let mut records = self.records_in(collection);
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }
}
