//! Storage layer.
//!
//! - [`contact`]: the contact store trait and its `SQLite` backend
//! - [`sqlite`]: connection helpers shared by `SQLite` backends

// Dropping connection guards a few statements early buys nothing here.
#![allow(clippy::significant_drop_tightening)]

pub mod contact;
pub mod sqlite;

pub use contact::{ContactBackend, ContactStorageFactory, SqliteContactBackend};
