use super::{types::Config, ConfigError, StorageBackend};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - The selected backend has a non-empty path
/// - The seeded admin password is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    match config.storage.backend {
        StorageBackend::File if config.storage.file.path.as_os_str().is_empty() => {
            return Err(ConfigError::ValidationError(
                "storage.file.path cannot be empty".to_string(),
            ));
        }
        StorageBackend::Sqlite if config.storage.database.path.as_os_str().is_empty() => {
            return Err(ConfigError::ValidationError(
                "storage.database.path cannot be empty".to_string(),
            ));
        }
        _ => {}
    }

    if config.seed.admin_password.is_empty() {
        return Err(ConfigError::ValidationError(
            "seed.admin_password cannot be empty".to_string(),
        ));
    }

    Ok(())
}
