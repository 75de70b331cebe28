use arfoto_core::constants::{ALLOWED_IMAGE_CONTENT_TYPES, DEFAULT_MAX_FILE_SIZE_BYTES};
use arfoto_core::{PipelineConfig, PipelineError};
use std::path::Path;

/// Validation errors for selected photos
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    UnsupportedType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },
}

impl From<ValidationError> for PipelineError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnsupportedType { content_type, .. } => {
                PipelineError::UnsupportedType { content_type }
            }
            ValidationError::FileTooLarge { size, max } => PipelineError::FileTooLarge { size, max },
        }
    }
}

/// Media file validator
///
/// Runs on the declared type and size only, before any byte is decoded.
#[derive(Debug, Clone)]
pub struct MediaValidator {
    max_file_size: u64,
    allowed_content_types: Vec<String>,
}

impl Default for MediaValidator {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_FILE_SIZE_BYTES,
            ALLOWED_IMAGE_CONTENT_TYPES
                .iter()
                .map(|ct| ct.to_string())
                .collect(),
        )
    }
}

impl MediaValidator {
    pub fn new(max_file_size: u64, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.max_file_size_bytes,
            config.allowed_content_types.clone(),
        )
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type.trim().to_lowercase();

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::UnsupportedType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate file size. The ceiling itself is already too large.
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size >= self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Type first, then size.
    pub fn validate(&self, content_type: &str, size: u64) -> Result<(), ValidationError> {
        self.validate_content_type(content_type)?;
        self.validate_file_size(size)
    }

    /// Best-effort MIME type for selectors that only know a file name.
    pub fn content_type_for_extension(filename: &str) -> &'static str {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        }
    }
}
