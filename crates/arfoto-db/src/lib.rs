//! arfoto document store
//!
//! Persists gallery records. The store, not the client, assigns each record's id
//! and creation timestamp.

pub mod error;
pub mod factory;
pub mod gallery;
pub mod store;

pub use error::{DocumentStoreError, DocumentStoreResult};
pub use factory::create_document_store;
pub use gallery::{LocalDocumentStore, MemoryDocumentStore};
#[cfg(feature = "postgres")]
pub use gallery::PgDocumentStore;
pub use store::DocumentStore;
