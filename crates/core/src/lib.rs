pub mod auth;
pub mod config;
pub mod store;

pub use auth::passwords_match;
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, DatabaseConfig, FileStoreConfig, SeedConfig, ServerConfig, StorageBackend,
    StorageConfig,
};
pub use store::{
    create_store, Dataset, JsonFileStore, NameCollection, NewTicket, SeedData, SqliteStore, Store,
    StoreError, Ticket, TicketUpdate, DEFAULT_STATUS,
};
