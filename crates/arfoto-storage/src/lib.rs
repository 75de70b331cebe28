//! arfoto Storage Library
//!
//! Blob storage abstraction for compressed gallery photos, with local filesystem,
//! S3 and in-memory implementations.
//!
//! # Storage key format
//!
//! `{prefix}/{label}_{millis}_{name}.{ext}`, e.g. `fotos_feria/feria_1700000000000_Papá_Noel.jpg`.
//! `millis` comes from a per-generator monotonic clock, so keys never repeat within a
//! process. Keys must not contain `..` or a leading `/`. Key generation is centralized
//! in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use arfoto_core::StorageBackend;
pub use factory::create_storage;
pub use keys::{sanitize_name, StorageKeyGenerator};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{BlobStore, StorageError, StorageResult};
