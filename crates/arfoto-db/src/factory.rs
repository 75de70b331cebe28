use arfoto_core::{DocumentStoreKind, PipelineConfig};
use std::sync::Arc;

use crate::error::{DocumentStoreError, DocumentStoreResult};
use crate::gallery::{LocalDocumentStore, MemoryDocumentStore};
use crate::store::DocumentStore;

/// Create a document store based on configuration
pub async fn create_document_store(
    config: &PipelineConfig,
) -> DocumentStoreResult<Arc<dyn DocumentStore>> {
    match config.document_store {
        #[cfg(feature = "postgres")]
        DocumentStoreKind::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                DocumentStoreError::ConfigError("DATABASE_URL not configured".to_string())
            })?;
            let store = crate::gallery::PgDocumentStore::connect(url).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "postgres"))]
        DocumentStoreKind::Postgres => Err(DocumentStoreError::ConfigError(
            "Postgres document store not available (postgres feature not enabled)".to_string(),
        )),

        DocumentStoreKind::Local => {
            let root = config.local_gallery_path.as_deref().ok_or_else(|| {
                DocumentStoreError::ConfigError("LOCAL_GALLERY_PATH not configured".to_string())
            })?;
            Ok(Arc::new(LocalDocumentStore::new(root).await?))
        }

        DocumentStoreKind::Memory => {
            tracing::warn!("Using in-memory document store; gallery records are lost on exit");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_local_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            document_store: DocumentStoreKind::Local,
            local_gallery_path: Some(dir.path().to_string_lossy().to_string()),
            ..Default::default()
        };
        let store = create_document_store(&config).await.unwrap();
        assert!(store.list("galeria", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_postgres_requires_url() {
        let config = PipelineConfig {
            document_store: DocumentStoreKind::Postgres,
            ..Default::default()
        };
        let result = create_document_store(&config).await;
        assert!(matches!(result, Err(DocumentStoreError::ConfigError(_))));
    }
}
