//! Storage collaborators for key metadata and sealed records.

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryKeyStore;
pub use sqlite::SqliteStore;
pub use traits::{KeyMetadataStore, RecordStore};
