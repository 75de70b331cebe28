//! Error types module
//!
//! Every failure of a pipeline run is unified under [`PipelineError`]. The driver
//! turns it into a localized notification through [`ErrorMetadata`] and logs it at
//! the level the variant declares.

use std::time::Duration;

use crate::locale::Locale;
use crate::models::PipelineStage;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a bad input file
    Warn,
    /// Error level - for backend failures
    Error,
}

/// Metadata describing how an error is presented to the user
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether the error ends the current run (as opposed to being rejected
    /// before the run started)
    fn aborts_run(&self) -> bool;

    /// Localized, human-readable message for the blocking notification
    fn client_message(&self, locale: Locale) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Unsupported content type: {content_type}")]
    UnsupportedType { content_type: String },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Image decode failed: {0}")]
    DecodeError(String),

    #[error("Storage error: {reason}")]
    StorageError { reason: String },

    #[error("Gallery record write failed: {0}")]
    RecordError(String),

    #[error("Stage {stage} timed out after {timeout:?}")]
    Timeout {
        stage: PipelineStage,
        timeout: Duration,
    },

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Pipeline is not idle; acknowledge or reset before starting a new run")]
    Busy,

    #[error("File selection failed: {0}")]
    Selection(String),
}

impl PipelineError {
    /// Generic reason used when the storage backend gives none.
    pub const GENERIC_STORAGE_REASON: &'static str = "unknown storage error";

    /// Build a storage error, falling back to a generic reason.
    pub fn storage(reason: Option<String>) -> Self {
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| Self::GENERIC_STORAGE_REASON.to_string());
        PipelineError::StorageError { reason }
    }
}

/// Static metadata for each variant: (error_code, aborts_run, log_level).
fn pipeline_error_static_metadata(err: &PipelineError) -> (&'static str, bool, LogLevel) {
    match err {
        PipelineError::UnsupportedType { .. } => ("UNSUPPORTED_TYPE", true, LogLevel::Debug),
        PipelineError::FileTooLarge { .. } => ("FILE_TOO_LARGE", true, LogLevel::Debug),
        PipelineError::DecodeError(_) => ("DECODE_ERROR", true, LogLevel::Warn),
        PipelineError::StorageError { .. } => ("STORAGE_ERROR", true, LogLevel::Error),
        PipelineError::RecordError(_) => ("RECORD_ERROR", true, LogLevel::Error),
        PipelineError::Timeout { .. } => ("TIMEOUT", true, LogLevel::Warn),
        PipelineError::Cancelled => ("CANCELLED", true, LogLevel::Debug),
        PipelineError::Busy => ("BUSY", false, LogLevel::Debug),
        PipelineError::Selection(_) => ("SELECTION_FAILED", false, LogLevel::Warn),
    }
}

fn megabytes(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        pipeline_error_static_metadata(self).0
    }

    fn aborts_run(&self) -> bool {
        pipeline_error_static_metadata(self).1
    }

    fn client_message(&self, locale: Locale) -> String {
        let detail = match (locale, self) {
            (Locale::Es, PipelineError::UnsupportedType { .. }) => {
                "Solo se permiten imágenes (JPG, PNG, WEBP)".to_string()
            }
            (Locale::En, PipelineError::UnsupportedType { .. }) => {
                "Only images are allowed (JPG, PNG, WEBP)".to_string()
            }
            (Locale::Es, PipelineError::FileTooLarge { max, .. }) => {
                format!("La imagen es muy pesada (máx. {}MB)", megabytes(*max))
            }
            (Locale::En, PipelineError::FileTooLarge { max, .. }) => {
                format!("The image is too large (max. {}MB)", megabytes(*max))
            }
            (Locale::Es, PipelineError::DecodeError(_)) => {
                "No se pudo leer la imagen, prueba con otro archivo".to_string()
            }
            (Locale::En, PipelineError::DecodeError(_)) => {
                "The image could not be read, try another file".to_string()
            }
            (_, PipelineError::StorageError { reason }) => reason.clone(),
            (Locale::Es, PipelineError::RecordError(_)) => {
                "No se pudo guardar la foto en la galería".to_string()
            }
            (Locale::En, PipelineError::RecordError(_)) => {
                "The photo could not be saved to the gallery".to_string()
            }
            (Locale::Es, PipelineError::Timeout { .. }) => {
                "La conexión tardó demasiado. Intenta de nuevo.".to_string()
            }
            (Locale::En, PipelineError::Timeout { .. }) => {
                "The connection took too long. Try again.".to_string()
            }
            (Locale::Es, PipelineError::Cancelled) => "Subida cancelada".to_string(),
            (Locale::En, PipelineError::Cancelled) => "Upload cancelled".to_string(),
            (Locale::Es, PipelineError::Busy) => "Ya hay una foto subiéndose".to_string(),
            (Locale::En, PipelineError::Busy) => "A photo is already uploading".to_string(),
            (Locale::Es, PipelineError::Selection(_)) => {
                "No se pudo abrir el archivo seleccionado".to_string()
            }
            (Locale::En, PipelineError::Selection(_)) => {
                "The selected file could not be opened".to_string()
            }
        };

        let prefix = match locale {
            Locale::Es => "Error al subir la foto.",
            Locale::En => "Failed to upload the photo.",
        };
        format!("{} {}", prefix, detail)
    }

    fn log_level(&self) -> LogLevel {
        pipeline_error_static_metadata(self).2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            PipelineError::UnsupportedType {
                content_type: "image/gif".to_string(),
            },
            PipelineError::FileTooLarge { size: 1, max: 0 },
            PipelineError::DecodeError("x".to_string()),
            PipelineError::storage(None),
            PipelineError::RecordError("x".to_string()),
            PipelineError::Timeout {
                stage: PipelineStage::Upload,
                timeout: Duration::from_secs(1),
            },
            PipelineError::Cancelled,
            PipelineError::Busy,
            PipelineError::Selection("x".to_string()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.error_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_file_too_large_message_mentions_ceiling() {
        let err = PipelineError::FileTooLarge {
            size: 15 * 1024 * 1024,
            max: 10 * 1024 * 1024,
        };
        assert_eq!(
            err.client_message(Locale::Es),
            "Error al subir la foto. La imagen es muy pesada (máx. 10MB)"
        );
        assert!(err.client_message(Locale::En).contains("max. 10MB"));
    }

    #[test]
    fn test_storage_reason_is_passed_through() {
        let err = PipelineError::storage(Some("storage/unauthorized".to_string()));
        assert_eq!(
            err.client_message(Locale::Es),
            "Error al subir la foto. storage/unauthorized"
        );
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_storage_reason_falls_back_to_generic() {
        let err = PipelineError::storage(Some("   ".to_string()));
        assert!(matches!(
            err,
            PipelineError::StorageError { ref reason } if reason == PipelineError::GENERIC_STORAGE_REASON
        ));
    }

    #[test]
    fn test_pre_run_rejections_do_not_abort_runs() {
        assert!(!PipelineError::Busy.aborts_run());
        assert!(!PipelineError::Selection("gone".to_string()).aborts_run());
        assert!(PipelineError::Cancelled.aborts_run());
    }
}
