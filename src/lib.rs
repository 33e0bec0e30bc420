//! # Contacts
//!
//! A server-rendered contact book.
//!
//! Users list, view, add, edit and delete contacts (name, email, phone)
//! through plain HTML forms. Submissions are validated field by field and
//! outcomes are reported with one-shot flash messages.
//!
//! ## Layout
//!
//! - [`storage`]: the contact store (`SQLite`)
//! - [`services`]: validation pipeline and the async contact service
//! - [`rendering`]: named page templates with a shared layout
//! - [`web`]: router, handlers, flash channel and method override
//! - [`config`] and [`observability`]: ambient setup
//!
//! ## Example
//!
//! ```rust,ignore
//! use contacts::config::ContactsConfig;
//! use contacts::storage::ContactStorageFactory;
//! use contacts::web::{AppState, build_app};
//!
//! let config = ContactsConfig::default();
//! let backend = ContactStorageFactory::create_in_memory()?;
//! let app = build_app(AppState::new(backend, &config)?);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod models;
pub mod observability;
pub mod rendering;
pub mod services;
pub mod storage;
pub mod web;

pub use config::{ContactsConfig, PhoneRegion};
pub use models::{Contact, ContactId, NewContact};
pub use services::{ContactService, FieldError, ValidationErrors, Validator};
pub use storage::{ContactBackend, ContactStorageFactory, SqliteContactBackend};

/// Error type for contact operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed configuration values, unknown phone region |
/// | `DuplicateName` | The store's unique constraint rejects a contact name |
/// | `NotFound` | A requested contact does not exist |
/// | `OperationFailed` | `SQLite`, I/O, template or runtime failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A contact with this name already exists.
    ///
    /// Raised by the store when an insert or update collides with the
    /// `UNIQUE` constraint on `name`. Handlers surface it as a validation
    /// error, not as a failure page.
    #[error("contact '{name}' already exists")]
    DuplicateName {
        /// The rejected name.
        name: String,
    },

    /// The requested contact does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` statements fail or the database cannot be opened
    /// - Filesystem I/O errors occur
    /// - A template fails to render
    /// - A blocking task panics or is cancelled
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for contact operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
///
/// # Examples
///
/// ```rust
/// use contacts::current_timestamp;
///
/// assert!(current_timestamp() > 0);
/// ```
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::OperationFailed {
            operation: "test".to_string(),
            cause: "failed".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'test' failed: failed");

        let err = Error::DuplicateName {
            name: "Agung".to_string(),
        };
        assert_eq!(err.to_string(), "contact 'Agung' already exists");

        let err = Error::NotFound("contact 'Nobody'".to_string());
        assert_eq!(err.to_string(), "not found: contact 'Nobody'");
    }
}
