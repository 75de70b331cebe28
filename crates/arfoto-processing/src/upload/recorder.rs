use arfoto_core::{Avatar, GalleryRecord, NewGalleryRecord, PipelineError};
use arfoto_db::DocumentStore;
use std::sync::Arc;

/// Appends gallery records for uploaded photos.
pub struct Recorder {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl Recorder {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub async fn record(
        &self,
        url: &str,
        avatar: &Avatar,
        file_size: u64,
    ) -> Result<GalleryRecord, PipelineError> {
        let record = NewGalleryRecord::for_avatar(url, avatar, file_size);
        self.store
            .insert(&self.collection, record)
            .await
            .map_err(|e| PipelineError::RecordError(e.to_string()))
    }
}
