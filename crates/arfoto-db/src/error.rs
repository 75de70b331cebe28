#[cfg(feature = "postgres")]
use sqlx::Error as SqlxError;

/// Document store errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

/// Collection names become table values or directory names; keep them plain.
pub fn validate_collection(collection: &str) -> DocumentStoreResult<()> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(DocumentStoreError::InvalidCollection(collection.to_string()));
    }
    Ok(())
}
