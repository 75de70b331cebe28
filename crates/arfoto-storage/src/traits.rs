//! Storage abstraction trait
//!
//! This module defines the BlobStore trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Backend-supplied reason, if the backend gave one.
    pub fn reason(&self) -> Option<String> {
        match self {
            StorageError::Cancelled => None,
            StorageError::PermissionDenied(msg) if msg.is_empty() => {
                Some("permission denied".to_string())
            }
            StorageError::UploadFailed(msg)
            | StorageError::NotFound(msg)
            | StorageError::InvalidKey(msg)
            | StorageError::BackendError(msg)
            | StorageError::ConfigError(msg)
                if msg.is_empty() =>
            {
                None
            }
            other => Some(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Blob storage abstraction trait
///
/// A blob is written under a caller-chosen key; its retrieval URL is resolved in a
/// separate call once the write has been acknowledged.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `data` under `storage_key`, overwriting any existing object
    async fn put(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Resolve the public retrieval URL for an existing object
    async fn resolve_url(&self, storage_key: &str) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
