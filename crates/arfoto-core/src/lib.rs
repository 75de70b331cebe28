//! arfoto Core Library
//!
//! This crate provides the domain models, error types, configuration and AR viewer
//! descriptors shared by every arfoto component.

pub mod ar;
pub mod config;
pub mod constants;
pub mod error;
pub mod locale;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use ar::{CaptureHint, CaptureSources, FileRequest, ViewerConfig};
pub use config::PipelineConfig;
pub use error::{ErrorMetadata, LogLevel, PipelineError};
pub use locale::Locale;
pub use models::{
    Avatar, CompressedAsset, GalleryRecord, MediaAsset, NewGalleryRecord, PipelineStage,
    PipelineState, UploadTarget,
};
pub use storage_types::{DocumentStoreKind, StorageBackend};
