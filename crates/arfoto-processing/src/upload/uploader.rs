use arfoto_core::constants::OUTPUT_EXTENSION;
use arfoto_core::{Avatar, CompressedAsset, PipelineConfig, PipelineError, UploadTarget};
use arfoto_storage::{BlobStore, StorageError, StorageKeyGenerator};
use std::sync::Arc;

fn storage_failure(err: StorageError) -> PipelineError {
    PipelineError::storage(err.reason())
}

/// Writes compressed photos to blob storage under generated keys.
pub struct Uploader {
    store: Arc<dyn BlobStore>,
    keys: StorageKeyGenerator,
}

impl Uploader {
    pub fn new(store: Arc<dyn BlobStore>, keys: StorageKeyGenerator) -> Self {
        Self { store, keys }
    }

    pub fn from_config(store: Arc<dyn BlobStore>, config: &PipelineConfig) -> Self {
        Self::new(
            store,
            StorageKeyGenerator::new(
                config.storage_key_prefix.clone(),
                config.storage_key_label.clone(),
                OUTPUT_EXTENSION,
            ),
        )
    }

    /// Fresh key for a photo taken with `avatar`.
    pub fn target_for(&self, avatar: &Avatar) -> UploadTarget {
        UploadTarget::new(self.keys.generate(&avatar.name))
    }

    pub async fn put(
        &self,
        target: &UploadTarget,
        asset: &CompressedAsset,
    ) -> Result<(), PipelineError> {
        self.store
            .put(&target.key, asset.data.clone(), asset.content_type)
            .await
            .map_err(storage_failure)
    }

    pub async fn resolve(&self, target: UploadTarget) -> Result<UploadTarget, PipelineError> {
        let url = self
            .store
            .resolve_url(&target.key)
            .await
            .map_err(storage_failure)?;
        Ok(target.resolved(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arfoto_storage::MemoryStorage;
    use bytes::Bytes;

    fn asset() -> CompressedAsset {
        CompressedAsset {
            data: Bytes::from_static(b"jpeg"),
            content_type: "image/jpeg",
            width: 1,
            height: 1,
            size: 4,
        }
    }

    fn fixed_clock() -> u64 {
        1_700_000_000_000
    }

    #[tokio::test]
    async fn test_put_then_resolve() {
        let store = Arc::new(MemoryStorage::new("https://cdn.test"));
        let uploader = Uploader::new(
            store.clone(),
            StorageKeyGenerator::with_clock("fotos_feria", "feria", "jpg", fixed_clock),
        );

        let target = uploader.target_for(&Avatar::new("Papa Noel", "/models/santa.glb"));
        assert_eq!(target.key, "fotos_feria/feria_1700000000000_Papa_Noel.jpg");

        uploader.put(&target, &asset()).await.unwrap();
        let target = uploader.resolve(target).await.unwrap();

        assert_eq!(
            target.url.as_deref(),
            Some("https://cdn.test/fotos_feria/feria_1700000000000_Papa_Noel.jpg")
        );
        assert_eq!(store.get(&target.key).unwrap().content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_backend_reason_is_kept() {
        let store = Arc::new(MemoryStorage::default());
        store.fail_puts_with(|| StorageError::PermissionDenied("bucket is read-only".to_string()));
        let uploader = Uploader::new(
            store,
            StorageKeyGenerator::new("fotos_feria", "feria", "jpg"),
        );

        let target = uploader.target_for(&Avatar::new("Robot", "/models/robot.glb"));
        let err = uploader.put(&target, &asset()).await.unwrap_err();
        match err {
            PipelineError::StorageError { reason } => assert!(reason.contains("read-only")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_reason_falls_back_to_generic() {
        let store = Arc::new(MemoryStorage::default());
        store.fail_puts_with(|| StorageError::Cancelled);
        let uploader = Uploader::new(
            store,
            StorageKeyGenerator::new("fotos_feria", "feria", "jpg"),
        );

        let target = uploader.target_for(&Avatar::new("Robot", "/models/robot.glb"));
        let err = uploader.put(&target, &asset()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::StorageError { ref reason } if reason == PipelineError::GENERIC_STORAGE_REASON
        ));
    }
}
