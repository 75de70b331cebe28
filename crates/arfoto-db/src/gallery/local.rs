use arfoto_core::{GalleryRecord, NewGalleryRecord};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use crate::error::{validate_collection, DocumentStoreError, DocumentStoreResult};
use crate::store::DocumentStore;

/// Gallery records as JSON files: `{root}/{collection}/{id}.json`
#[derive(Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub async fn new(root: impl Into<PathBuf>) -> DocumentStoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            DocumentStoreError::ConfigError(format!(
                "Failed to create gallery directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    fn collection_dir(&self, collection: &str) -> DocumentStoreResult<PathBuf> {
        validate_collection(collection)?;
        Ok(self.root.join(collection))
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    #[tracing::instrument(skip(self, record), fields(db.collection = %collection, db.operation = "insert"))]
    async fn insert(
        &self,
        collection: &str,
        record: NewGalleryRecord,
    ) -> DocumentStoreResult<GalleryRecord> {
        let dir = self.collection_dir(collection)?;
        fs::create_dir_all(&dir).await?;

        let record = record.into_record(Uuid::new_v4(), Utc::now());
        let body = serde_json::to_vec_pretty(&record)?;

        // Write then rename so readers never see a partial record.
        let tmp = dir.join(format!(".{}.json.tmp", record.id));
        let path = dir.join(format!("{}.json", record.id));
        fs::write(&tmp, &body).await?;
        fs::rename(&tmp, &path).await?;

        tracing::debug!(path = %path.display(), "Gallery record written");
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.collection = %collection, db.operation = "select"))]
    async fn list(&self, collection: &str, limit: usize) -> DocumentStoreResult<Vec<GalleryRecord>> {
        let dir = self.collection_dir(collection)?;
        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let body = fs::read(&path).await?;
            match serde_json::from_slice::<GalleryRecord>(&body) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable gallery record");
                }
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_record(avatar: &str) -> NewGalleryRecord {
        NewGalleryRecord {
            url: format!("http://localhost:3000/media/{}.jpg", avatar),
            avatar: avatar.to_string(),
            avatar_file: format!("/models/{}.glb", avatar),
            file_size: 1234,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_round_trip() {
        let dir = tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path()).await.unwrap();

        let first = store.insert("galeria", new_record("robot")).await.unwrap();
        let second = store.insert("galeria", new_record("santa")).await.unwrap();

        let listed = store.list("galeria", 10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1], first);

        let limited = store.list("galeria", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_list_unknown_collection_is_empty() {
        let dir = tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path()).await.unwrap();
        assert!(store.list("galeria", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_traversal_collection() {
        let dir = tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path()).await.unwrap();
        let result = store.insert("../outside", new_record("robot")).await;
        assert!(matches!(result, Err(DocumentStoreError::InvalidCollection(_))));
    }
}
