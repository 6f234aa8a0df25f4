//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur in a [`Store`](super::Store).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record with the same unique name already exists.
    #[error("Already exists: {0}")]
    Conflict(String),

    /// The supplied admin password does not match.
    #[error("Admin password mismatch")]
    Unauthorized,

    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The database rejected a statement or could not be opened.
    #[error("Database error: {0}")]
    Database(String),

    /// Persisted data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn ticket_not_found(id: i64) -> Self {
        StoreError::NotFound(format!("ticket {}", id))
    }

    /// Failures the caller cannot act on, reported as a generic server error.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            StoreError::Io(_) | StoreError::Database(_) | StoreError::Serialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_classification() {
        assert!(StoreError::Database("locked".to_string()).is_internal());
        assert!(StoreError::Serialization("bad json".to_string()).is_internal());
        assert!(StoreError::Io(std::io::Error::other("disk")).is_internal());
        assert!(!StoreError::ticket_not_found(1).is_internal());
        assert!(!StoreError::Conflict("Design".to_string()).is_internal());
        assert!(!StoreError::Unauthorized.is_internal());
    }

    #[test]
    fn test_display() {
        assert_eq!(StoreError::ticket_not_found(42).to_string(), "Not found: ticket 42");
        assert_eq!(
            StoreError::Conflict("Design".to_string()).to_string(),
            "Already exists: Design"
        );
    }
}
