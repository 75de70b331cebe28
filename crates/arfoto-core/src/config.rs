//! Configuration module
//!
//! Pipeline limits, storage key layout, backend selection and locale, loaded from
//! the environment (a `.env` file is honoured when present).

use std::env;
use std::time::Duration;

use crate::ar::CaptureSources;
use crate::constants::{
    ALLOWED_IMAGE_CONTENT_TYPES, DEFAULT_GALLERY_COLLECTION, DEFAULT_JPEG_QUALITY,
    DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_MAX_IMAGE_WIDTH, DEFAULT_STORAGE_KEY_LABEL,
    DEFAULT_STORAGE_KEY_PREFIX,
};
use crate::locale::Locale;
use crate::storage_types::{DocumentStoreKind, StorageBackend};

/// Pipeline configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    // Validation
    pub max_file_size_bytes: u64,
    pub allowed_content_types: Vec<String>,
    // Compression
    pub max_image_width: u32,
    pub jpeg_quality: u8,
    // Storage key layout: <prefix>/<label>_<millis>_<name>.<ext>
    pub storage_key_prefix: String,
    pub storage_key_label: String,
    pub gallery_collection: String,
    /// Per network stage. `None` waits indefinitely.
    pub stage_timeout: Option<Duration>,
    pub locale: Locale,
    pub capture_sources: CaptureSources,
    // Blob storage
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    // Document store
    pub document_store: DocumentStoreKind,
    pub local_gallery_path: Option<String>,
    pub database_url: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            allowed_content_types: ALLOWED_IMAGE_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_image_width: DEFAULT_MAX_IMAGE_WIDTH,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            storage_key_prefix: DEFAULT_STORAGE_KEY_PREFIX.to_string(),
            storage_key_label: DEFAULT_STORAGE_KEY_LABEL.to_string(),
            gallery_collection: DEFAULT_GALLERY_COLLECTION.to_string(),
            stage_timeout: None,
            locale: Locale::default(),
            capture_sources: CaptureSources::default(),
            storage_backend: StorageBackend::Memory,
            local_storage_path: None,
            local_storage_base_url: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            document_store: DocumentStoreKind::Memory,
            local_gallery_path: None,
            database_url: None,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", key, raw, e))
}

fn env_parse<T>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    Ok(env_opt(key)
        .map(|v| parse_value(key, &v))
        .transpose()?
        .unwrap_or(default))
}

fn megabytes_to_bytes(mb: u64) -> Result<u64, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB {} is too large", mb))
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let max_file_size_bytes = env_opt("MAX_FILE_SIZE_MB")
            .map(|v| parse_value::<u64>("MAX_FILE_SIZE_MB", &v).and_then(megabytes_to_bytes))
            .transpose()?
            .unwrap_or(defaults.max_file_size_bytes);

        let allowed_content_types = env_opt("ALLOWED_CONTENT_TYPES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_content_types);

        let stage_timeout = env_opt("STAGE_TIMEOUT_SECS")
            .map(|v| parse_value::<u64>("STAGE_TIMEOUT_SECS", &v).map(Duration::from_secs))
            .transpose()?
            .filter(|d| !d.is_zero());

        let locale = env_opt("LOCALE")
            .map(|v| v.parse::<Locale>())
            .transpose()?
            .unwrap_or(defaults.locale);

        let capture_sources = env_opt("CAPTURE_SOURCES")
            .map(|v| v.parse::<CaptureSources>())
            .transpose()?
            .unwrap_or(defaults.capture_sources);

        let storage_backend = env_opt("STORAGE_BACKEND")
            .map(|v| v.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::Local);

        let document_store = env_opt("DOCUMENT_STORE")
            .map(|v| v.parse::<DocumentStoreKind>())
            .transpose()?
            .unwrap_or(DocumentStoreKind::Local);

        let config = Self {
            max_file_size_bytes,
            allowed_content_types,
            max_image_width: env_parse("MAX_IMAGE_WIDTH", defaults.max_image_width)?,
            jpeg_quality: env_parse("JPEG_QUALITY", defaults.jpeg_quality)?,
            storage_key_prefix: env_opt("STORAGE_KEY_PREFIX")
                .unwrap_or(defaults.storage_key_prefix),
            storage_key_label: env_opt("STORAGE_KEY_LABEL").unwrap_or(defaults.storage_key_label),
            gallery_collection: env_opt("GALLERY_COLLECTION")
                .unwrap_or(defaults.gallery_collection),
            stage_timeout,
            locale,
            capture_sources,
            storage_backend,
            local_storage_path: env_opt("LOCAL_STORAGE_PATH")
                .or_else(|| Some("./data/media".to_string())),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL")
                .or_else(|| Some("http://localhost:3000/media".to_string())),
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            document_store,
            local_gallery_path: env_opt("LOCAL_GALLERY_PATH")
                .or_else(|| Some("./data/gallery".to_string())),
            database_url: env_opt("DATABASE_URL"),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_CONTENT_TYPES cannot be empty"));
        }
        if self.max_image_width == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_WIDTH must be greater than 0"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(anyhow::anyhow!(
                "JPEG_QUALITY must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }
        if self.storage_key_prefix.contains("..") || self.storage_key_prefix.starts_with('/') {
            return Err(anyhow::anyhow!(
                "STORAGE_KEY_PREFIX must be a relative path without '..'"
            ));
        }
        if self.gallery_collection.trim().is_empty() {
            return Err(anyhow::anyhow!("GALLERY_COLLECTION cannot be empty"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!("S3_BUCKET is required for the s3 backend"));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION is required for the s3 backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL are required for the local backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        match self.document_store {
            DocumentStoreKind::Postgres if self.database_url.is_none() => Err(anyhow::anyhow!(
                "DATABASE_URL is required for the postgres document store"
            )),
            DocumentStoreKind::Local if self.local_gallery_path.is_none() => Err(anyhow::anyhow!(
                "LOCAL_GALLERY_PATH is required for the local document store"
            )),
            _ => Ok(()),
        }
    }
}
