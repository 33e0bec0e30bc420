//! Contact storage trait definitions.

use crate::Result;
use crate::models::{Contact, ContactId, NewContact};

/// Trait for contact storage backends.
///
/// Implementations must be thread-safe (`Send + Sync`). Operations are
/// synchronous; async callers go through
/// [`ContactService`](crate::services::ContactService).
pub trait ContactBackend: Send + Sync {
    /// Lists all contacts, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    fn list(&self) -> Result<Vec<Contact>>;

    /// Gets a contact by exact name.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    fn get_by_name(&self, name: &str) -> Result<Option<Contact>>;

    /// Gets a contact by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    fn get(&self, id: &ContactId) -> Result<Option<Contact>>;

    /// Inserts a new contact and returns it with its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A contact with the same name already exists ([`Error::DuplicateName`](crate::Error::DuplicateName))
    /// - Storage cannot be accessed
    fn insert(&self, contact: NewContact) -> Result<Contact>;

    /// Replaces the name, email and phone of an existing contact.
    ///
    /// The write and the read-back happen under one lock.
    ///
    /// # Returns
    ///
    /// The updated contact, or `None` if no contact has this ID.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The new name belongs to another contact ([`Error::DuplicateName`](crate::Error::DuplicateName))
    /// - Storage cannot be accessed
    fn update(&self, id: &ContactId, contact: NewContact) -> Result<Option<Contact>>;

    /// Deletes the contact with the given name.
    ///
    /// # Returns
    ///
    /// True if a contact was deleted, false if none matched.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    fn delete_by_name(&self, name: &str) -> Result<bool>;

    /// Counts stored contacts.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    fn count(&self) -> Result<u64>;
}
