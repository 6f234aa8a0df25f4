//! Persistence for tickets, groups, authors and the admin password.

mod error;
mod file_store;
mod sqlite_store;
mod traits;
mod types;

use std::sync::Arc;

pub use error::StoreError;
pub use file_store::JsonFileStore;
pub use sqlite_store::SqliteStore;
pub use traits::Store;
pub use types::{
    next_ticket_id, now, sort_newest_first, Dataset, NameCollection, NewTicket, SeedData, Ticket,
    TicketUpdate, DEFAULT_STATUS,
};

use crate::config::{StorageBackend, StorageConfig};

/// Factory function to create the configured store backend
pub fn create_store(config: &StorageConfig, seed: SeedData) -> Result<Arc<dyn Store>, StoreError> {
    match config.backend {
        StorageBackend::File => Ok(Arc::new(JsonFileStore::new(&config.file.path, seed))),
        StorageBackend::Sqlite => Ok(Arc::new(SqliteStore::new(&config.database.path, seed)?)),
    }
}
