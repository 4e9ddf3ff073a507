pub mod manager;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use record::{Record, RecordError};
pub use repository::Repository;
pub use store::{Document, DocumentStore};
