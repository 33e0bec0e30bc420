//! Contact storage backends.
//!
//! Currently only `SQLite` is supported, either file-backed or in memory.

mod sqlite;
mod traits;

pub use sqlite::SqliteContactBackend;
pub use traits::ContactBackend;

use crate::Result;
use crate::config::StorageConfig;
use std::path::PathBuf;
use std::sync::Arc;

/// Factory for creating contact storage.
pub struct ContactStorageFactory;

impl ContactStorageFactory {
    /// Creates contact storage from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized.
    pub fn create(config: &StorageConfig) -> Result<Arc<dyn ContactBackend>> {
        if config.in_memory {
            tracing::warn!("Using in-memory contact store; contacts are lost on exit");
            return Self::create_in_memory();
        }
        Self::create_with_path(config.resolved_path())
    }

    /// Creates storage with an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn create_with_path(path: PathBuf) -> Result<Arc<dyn ContactBackend>> {
        Ok(Arc::new(SqliteContactBackend::new(path)?))
    }

    /// Creates an in-memory storage (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn create_in_memory() -> Result<Arc<dyn ContactBackend>> {
        Ok(Arc::new(SqliteContactBackend::in_memory()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_in_memory() {
        let config = StorageConfig {
            path: None,
            in_memory: true,
        };
        let storage = ContactStorageFactory::create(&config).unwrap();
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_create_with_path() {
        let dir = tempfile::TempDir::new().expect("failed to create temp dir");
        let config = StorageConfig {
            path: Some(dir.path().join("contacts.db")),
            in_memory: false,
        };

        let storage = ContactStorageFactory::create(&config);
        assert!(storage.is_ok());
        assert!(dir.path().join("contacts.db").exists());
    }
}
