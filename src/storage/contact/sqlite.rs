//! `SQLite` backend for contact storage.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::models::{Contact, ContactId, NewContact};
use crate::storage::sqlite::{
    acquire_lock, configure_connection, is_unique_violation, operation_failed,
};
use crate::{Error, Result};

use super::traits::ContactBackend;

const SELECT_COLUMNS: &str = "SELECT id, name, email, phone, created_at, updated_at FROM contacts";

/// SQLite-based contact storage backend.
///
/// The `name` column carries a `UNIQUE` constraint, so two racing inserts
/// of the same name cannot both succeed.
pub struct SqliteContactBackend {
    /// Database connection (mutex for interior mutability).
    conn: Mutex<Connection>,
}

impl SqliteContactBackend {
    /// Opens (or creates) a contact database at the specified path.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_database_dir".to_string(),
                cause: format!("{}: {e}", parent.display()),
            })?;
        }

        let conn = Connection::open(path).map_err(operation_failed("open_contact_database"))?;
        configure_connection(&conn)?;

        let backend = Self {
            conn: Mutex::new(conn),
        };
        backend.initialize_schema()?;
        tracing::debug!(path = %path.display(), "Opened contact database");
        Ok(backend)
    }

    /// Creates an in-memory contact backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(operation_failed("open_contact_database_memory"))?;

        let backend = Self {
            conn: Mutex::new(conn),
        };
        backend.initialize_schema()?;
        Ok(backend)
    }

    /// Initializes the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS contacts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
        )
        .map_err(operation_failed("initialize_contact_schema"))?;

        Ok(())
    }

    /// Gets the current Unix timestamp as i64 (for `SQLite` compatibility).
    #[allow(clippy::cast_possible_wrap)]
    fn now() -> i64 {
        crate::current_timestamp() as i64
    }

    /// Converts i64 from `SQLite` back to u64 timestamp.
    #[allow(clippy::cast_sign_loss)]
    const fn from_db_timestamp(ts: i64) -> u64 {
        ts as u64
    }

    fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
        Ok(Contact {
            id: ContactId::new(row.get::<_, String>(0)?),
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            created_at: Self::from_db_timestamp(row.get(4)?),
            updated_at: Self::from_db_timestamp(row.get(5)?),
        })
    }

    fn query_one(&self, clause: &str, key: &str, operation: &str) -> Result<Option<Contact>> {
        let conn = acquire_lock(&self.conn);
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE {clause} = ?1"),
            params![key],
            Self::contact_from_row,
        )
        .optional()
        .map_err(operation_failed(operation))
    }

    fn map_write_error(name: &str, operation: &str) -> impl FnOnce(rusqlite::Error) -> Error {
        let name = name.to_string();
        let operation = operation.to_string();
        move |e| {
            if is_unique_violation(&e) {
                Error::DuplicateName { name }
            } else {
                Error::OperationFailed {
                    operation,
                    cause: e.to_string(),
                }
            }
        }
    }
}

/// Records a counter and latency histogram for one store operation.
fn record_operation<T>(operation: &'static str, start: Instant, result: &Result<T>) {
    let status = if result.is_ok() { "success" } else { "error" };
    metrics::counter!(
        "contact_store_operations_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!("contact_store_operation_duration_ms", "operation" => operation)
        .record(start.elapsed().as_secs_f64() * 1000.0);
}

impl ContactBackend for SqliteContactBackend {
    fn list(&self) -> Result<Vec<Contact>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare(&format!(
                    "{SELECT_COLUMNS} ORDER BY name COLLATE NOCASE, created_at"
                ))
                .map_err(operation_failed("prepare_list_contacts"))?;

            let rows = stmt
                .query_map([], Self::contact_from_row)
                .map_err(operation_failed("list_contacts"))?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(operation_failed("read_contact_row"))
        })();
        record_operation("list", start, &result);
        result
    }

    fn get_by_name(&self, name: &str) -> Result<Option<Contact>> {
        let start = Instant::now();
        let result = self.query_one("name", name, "get_contact_by_name");
        record_operation("get_by_name", start, &result);
        result
    }

    fn get(&self, id: &ContactId) -> Result<Option<Contact>> {
        let start = Instant::now();
        let result = self.query_one("id", id.as_str(), "get_contact");
        record_operation("get", start, &result);
        result
    }

    fn insert(&self, contact: NewContact) -> Result<Contact> {
        let start = Instant::now();
        let now = Self::now();
        let contact = Contact::from_new(ContactId::generate(), contact, Self::from_db_timestamp(now));

        let result = {
            let conn = acquire_lock(&self.conn);
            conn.execute(
                "INSERT INTO contacts (id, name, email, phone, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    contact.id.as_str(),
                    contact.name,
                    contact.email,
                    contact.phone,
                    now,
                    now,
                ],
            )
            .map_err(Self::map_write_error(&contact.name, "insert_contact"))
        };
        record_operation("insert", start, &result);
        result?;

        Ok(contact)
    }

    fn update(&self, id: &ContactId, contact: NewContact) -> Result<Option<Contact>> {
        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            conn.query_row(
                "UPDATE contacts SET name = ?1, email = ?2, phone = ?3, updated_at = ?4
                 WHERE id = ?5
                 RETURNING id, name, email, phone, created_at, updated_at",
                params![
                    contact.name,
                    contact.email,
                    contact.phone,
                    Self::now(),
                    id.as_str()
                ],
                Self::contact_from_row,
            )
            .optional()
            .map_err(Self::map_write_error(&contact.name, "update_contact"))
        };
        record_operation("update", start, &result);
        result
    }

    fn delete_by_name(&self, name: &str) -> Result<bool> {
        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            conn.execute("DELETE FROM contacts WHERE name = ?1", params![name])
                .map_err(operation_failed("delete_contact"))
        };
        record_operation("delete_by_name", start, &result);

        Ok(result? > 0)
    }

    fn count(&self) -> Result<u64> {
        let conn = acquire_lock(&self.conn);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
            .map_err(operation_failed("count_contacts"))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
