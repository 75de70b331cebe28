//! In-process blob store.
//!
//! Used when no backend is configured and by tests, which can prime it to fail
//! writes or URL lookups the way a remote backend would.

use crate::keys::validate_key;
use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

type FailureFn = Box<dyn Fn() -> StorageError + Send + Sync>;

#[derive(Clone, Debug)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Mock storage implementation that stores objects in memory
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, StoredObject>>,
    base_url: String,
    put_failure: Mutex<Option<FailureFn>>,
    resolve_failure: Mutex<Option<FailureFn>>,
    put_attempts: AtomicUsize,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            base_url: base_url.into(),
            put_failure: Mutex::new(None),
            resolve_failure: Mutex::new(None),
            put_attempts: AtomicUsize::new(0),
        }
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<String, StoredObject>> {
        // A poisoned map is still consistent: every mutation is a single insert.
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every subsequent `put` fail with the error built by `make_error`.
    pub fn fail_puts_with(&self, make_error: impl Fn() -> StorageError + Send + Sync + 'static) {
        *self
            .put_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Box::new(make_error));
    }

    /// Make every subsequent `resolve_url` fail. Writes still succeed.
    pub fn fail_resolves_with(&self, make_error: impl Fn() -> StorageError + Send + Sync + 'static) {
        *self
            .resolve_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Box::new(make_error));
    }

    /// Get a stored object (for test assertions)
    pub fn get(&self, storage_key: &str) -> Option<StoredObject> {
        self.objects().get(storage_key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }

    /// Number of `put` calls, including failed ones.
    pub fn put_attempts(&self) -> usize {
        self.put_attempts.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new("memory://arfoto")
    }
}

#[async_trait]
impl BlobStore for MemoryStorage {
    async fn put(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);
        validate_key(storage_key)?;

        if let Some(make_error) = self
            .put_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
        {
            return Err(make_error());
        }

        tracing::debug!(key = %storage_key, size_bytes = data.len(), "Memory storage put");
        self.objects().insert(
            storage_key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn resolve_url(&self, storage_key: &str) -> StorageResult<String> {
        if let Some(make_error) = self
            .resolve_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
        {
            return Err(make_error());
        }

        if !self.objects().contains_key(storage_key) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }
        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            storage_key
        ))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects().contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_resolve() {
        let storage = MemoryStorage::new("https://cdn.example/");
        storage
            .put("fotos/a.jpg", Bytes::from_static(b"abc"), "image/jpeg")
            .await
            .unwrap();

        assert_eq!(
            storage.resolve_url("fotos/a.jpg").await.unwrap(),
            "https://cdn.example/fotos/a.jpg"
        );
        let stored = storage.get("fotos/a.jpg").unwrap();
        assert_eq!(stored.content_type, "image/jpeg");
        assert_eq!(stored.data.as_ref(), b"abc");
    }

    #[tokio::test]
    async fn test_primed_failure() {
        let storage = MemoryStorage::default();
        storage.fail_puts_with(|| StorageError::PermissionDenied("storage/unauthorized".into()));

        let result = storage
            .put("fotos/a.jpg", Bytes::from_static(b"abc"), "image/jpeg")
            .await;
        assert!(matches!(result, Err(StorageError::PermissionDenied(_))));
        assert!(storage.is_empty());
        assert_eq!(storage.put_attempts(), 1);
    }

    #[tokio::test]
    async fn test_primed_resolve_failure_keeps_object() {
        let storage = MemoryStorage::default();
        storage.fail_resolves_with(|| StorageError::BackendError("url signing failed".into()));

        storage
            .put("fotos/a.jpg", Bytes::from_static(b"abc"), "image/jpeg")
            .await
            .unwrap();
        let result = storage.resolve_url("fotos/a.jpg").await;

        assert!(matches!(result, Err(StorageError::BackendError(_))));
        assert!(storage.exists("fotos/a.jpg").await.unwrap());
        assert_eq!(storage.len(), 1);
    }
}
