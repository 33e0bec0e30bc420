//! Shared `SQLite` infrastructure for storage backends.

mod connection;

pub use connection::{
    BUSY_TIMEOUT_MS, acquire_lock, configure_connection, is_unique_violation, operation_failed,
};
