use arfoto_core::{GalleryRecord, NewGalleryRecord};
use async_trait::async_trait;

use crate::error::DocumentStoreResult;

/// Document store for gallery records
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a record into `collection`. The returned record carries the
    /// store-assigned id and creation time.
    async fn insert(
        &self,
        collection: &str,
        record: NewGalleryRecord,
    ) -> DocumentStoreResult<GalleryRecord>;

    /// Most recent records first.
    async fn list(&self, collection: &str, limit: usize) -> DocumentStoreResult<Vec<GalleryRecord>>;
}
