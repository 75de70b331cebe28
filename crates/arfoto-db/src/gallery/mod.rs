mod local;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use local::LocalDocumentStore;
pub use memory::MemoryDocumentStore;
#[cfg(feature = "postgres")]
pub use postgres::PgDocumentStore;
