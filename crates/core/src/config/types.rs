use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::store::SeedData;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    3000
}

/// Available storage backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Single JSON document, rewritten on every mutation.
    #[default]
    File,
    /// Relational tables in an SQLite database.
    Sqlite,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub file: FileStoreConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// JSON file backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileStoreConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data.json")
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Accepted for parity with networked databases; an embedded SQLite file has no TLS.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            verify_tls: default_verify_tls(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("ticketdesk.db")
}

fn default_verify_tls() -> bool {
    true
}

/// Data written on first initialization of an empty store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedConfig {
    #[serde(default = "default_groups")]
    pub groups: Vec<String>,
    #[serde(default = "default_authors")]
    pub authors: Vec<String>,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            groups: default_groups(),
            authors: default_authors(),
            admin_password: default_admin_password(),
        }
    }
}

fn default_groups() -> Vec<String> {
    ["Alle", "Support", "Entwicklung", "Design"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_authors() -> Vec<String> {
    ["Max Mustermann", "Anna Schmidt", "Tom Weber"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

impl From<&SeedConfig> for SeedData {
    fn from(seed: &SeedConfig) -> Self {
        SeedData {
            groups: seed.groups.clone(),
            authors: seed.authors.clone(),
            admin_password: seed.admin_password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.file.path.to_str().unwrap(), "data.json");
        assert_eq!(config.storage.database.path.to_str().unwrap(), "ticketdesk.db");
        assert!(config.storage.database.verify_tls);
        assert_eq!(config.seed.admin_password, "admin123");
        assert_eq!(config.seed.groups.len(), 4);
        assert_eq!(config.seed.authors.len(), 3);
    }

    #[test]
    fn test_deserialize_sqlite_backend() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[storage]
backend = "sqlite"

[storage.database]
path = "/data/tickets.sqlite"
verify_tls = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(
            config.storage.database.path.to_str().unwrap(),
            "/data/tickets.sqlite"
        );
        assert!(!config.storage.database.verify_tls);
    }

    #[test]
    fn test_deserialize_custom_seed() {
        let toml = r#"
[seed]
groups = ["Entwicklung", "Design"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.seed.groups, vec!["Entwicklung", "Design"]);
        // Unspecified seed keys keep their defaults
        assert_eq!(config.seed.authors.len(), 3);
        assert_eq!(config.seed.admin_password, "admin123");
    }

    #[test]
    fn test_unknown_backend_fails() {
        let toml = r#"
[storage]
backend = "postgres"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_seed_data_from_config() {
        let seed = SeedData::from(&SeedConfig::default());
        assert_eq!(seed.groups[0], "Alle");
        assert_eq!(seed.authors[2], "Tom Weber");
        assert_eq!(seed.admin_password, "admin123");
    }
}
