pub mod models;
pub mod postgres;
pub mod memory;
pub mod error;

// Re-exports
pub use models::{HistoryRecord, InventoryRecord, ProjectRecord};
pub use postgres::Database;
pub use memory::MemoryStorage;
pub use error::{Error, Result};
