//! File selection boundary.
//!
//! A selector answers one [`FileRequest`] with zero or one file. The platform
//! picker, a CLI argument and test doubles all sit behind [`FileSelector`].

use arfoto_core::{FileRequest, MediaAsset};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::validator::MediaValidator;

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Failed to read selected file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Selection unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait FileSelector: Send + Sync {
    /// `Ok(None)` means the user dismissed the picker.
    async fn select(&self, request: &FileRequest) -> Result<Option<MediaAsset>, SelectionError>;
}

/// Selects a file that is already known by path.
///
/// The content type is derived from the extension, like a browser file input does.
#[derive(Debug, Clone)]
pub struct PathSelector {
    path: Option<PathBuf>,
}

impl PathSelector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A selector that always reports a dismissed picker.
    pub fn dismissed() -> Self {
        Self { path: None }
    }
}

#[async_trait]
impl FileSelector for PathSelector {
    async fn select(&self, request: &FileRequest) -> Result<Option<MediaAsset>, SelectionError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        let data = tokio::fs::read(path)
            .await
            .map_err(|source| SelectionError::Read {
                path: path.display().to_string(),
                source,
            })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo")
            .to_string();
        let content_type = MediaValidator::content_type_for_extension(&filename);

        tracing::debug!(
            file = %filename,
            content_type,
            size_bytes = data.len(),
            accept = %request.accept,
            capture = ?request.capture,
            "File selected"
        );

        Ok(Some(MediaAsset::new(filename, content_type, data)))
    }
}
