//! Shared fixtures for pipeline integration tests.

#![allow(dead_code)]

use arfoto_core::{Avatar, MediaAsset, PipelineConfig, PipelineState};
use arfoto_db::MemoryDocumentStore;
use arfoto_processing::UploadDriver;
use arfoto_storage::{BlobStore, MemoryStorage, StorageBackend, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

pub const CDN: &str = "https://cdn.arfoto.test";

/// Driver wired to in-memory stores that the test keeps handles to.
pub struct TestPipeline {
    pub driver: UploadDriver,
    pub blobs: Arc<MemoryStorage>,
    pub documents: Arc<MemoryDocumentStore>,
}

impl TestPipeline {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        let blobs = Arc::new(MemoryStorage::new(CDN));
        let documents = Arc::new(MemoryDocumentStore::new());
        let driver = UploadDriver::from_config(&config, blobs.clone(), documents.clone());
        Self {
            driver,
            blobs,
            documents,
        }
    }

    /// Like `with_config`, but every blob write takes `delay` before landing.
    pub fn with_slow_uploads(config: PipelineConfig, delay: Duration) -> Self {
        let blobs = Arc::new(MemoryStorage::new(CDN));
        let documents = Arc::new(MemoryDocumentStore::new());
        let slow = Arc::new(SlowStorage {
            inner: blobs.clone(),
            delay,
        });
        let driver = UploadDriver::from_config(&config, slow, documents.clone());
        Self {
            driver,
            blobs,
            documents,
        }
    }
}

/// Blob store that stalls on `put`, like a backend on a bad connection.
pub struct SlowStorage {
    inner: Arc<MemoryStorage>,
    delay: Duration,
}

#[async_trait]
impl BlobStore for SlowStorage {
    async fn put(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.put(storage_key, data, content_type).await
    }

    async fn resolve_url(&self, storage_key: &str) -> StorageResult<String> {
        self.inner.resolve_url(storage_key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

pub fn robot() -> Avatar {
    Avatar::new("Robot Feria", "/models/robot.glb")
}

/// Encode a gradient image so the encoder has some real content to work with.
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .expect("fixture encodes");
    buffer
}

pub fn photo(name: &str, content_type: &str, width: u32, height: u32, format: ImageFormat) -> MediaAsset {
    MediaAsset::new(name, content_type, encoded_image(width, height, format))
}

/// An asset whose declared size differs from its payload, like a picker
/// reporting the on-disk size of a file.
pub fn declared(name: &str, content_type: &str, size: u64) -> MediaAsset {
    let mut asset = MediaAsset::new(name, content_type, vec![0u8; 16]);
    asset.size = size;
    asset
}

/// Drain all transitions published so far.
pub fn drain(rx: &mut broadcast::Receiver<PipelineState>) -> Vec<PipelineState> {
    let mut states = Vec::new();
    while let Ok(state) = rx.try_recv() {
        states.push(state);
    }
    states
}

pub fn progress_of(states: &[PipelineState]) -> Vec<u8> {
    states
        .iter()
        .filter_map(|s| match s {
            PipelineState::Running { progress } => Some(*progress),
            _ => None,
        })
        .collect()
}
