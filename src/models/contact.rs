//! Contact records.
//!
//! A contact is the only entity in the system. Each one carries a
//! store-assigned [`ContactId`] and three user-editable fields.
//!
//! # Example
//!
//! ```rust
//! use contacts::models::{Contact, ContactId, NewContact};
//!
//! let fields = NewContact::new("Agung", "agung@test.com", "081234567890");
//! let contact = Contact::from_new(ContactId::generate(), fields, 1_700_000_000);
//! assert_eq!(contact.name, "Agung");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a contact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    /// Creates a contact ID from the given string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new random contact ID.
    ///
    /// Uses UUID v4 so IDs minted in rapid succession never collide.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string()[..16].to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContactId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContactId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A persisted contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Store-assigned identifier.
    pub id: ContactId,
    /// Display name, unique across all contacts.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Mobile phone number.
    pub phone: String,
    /// Creation time (Unix seconds).
    pub created_at: u64,
    /// Last update time (Unix seconds).
    pub updated_at: u64,
}

impl Contact {
    /// Builds a contact from user-supplied fields.
    #[must_use]
    pub fn from_new(id: ContactId, fields: NewContact, now: u64) -> Self {
        Self {
            id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the editable fields of this contact.
    #[must_use]
    pub fn fields(&self) -> NewContact {
        NewContact {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// The user-editable fields of a contact.
///
/// Used both for inserts and for full replacement on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Mobile phone number.
    pub phone: String,
}

impl NewContact {
    /// Creates a new field set.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Returns a copy with surrounding whitespace removed from every field.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_id_generate() {
        let id1 = ContactId::generate();
        let id2 = ContactId::generate();
        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 16);
    }

    #[test]
    fn test_contact_id_display() {
        let id = ContactId::new("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(ContactId::from("abc123"), id);
    }

    #[test]
    fn test_from_new_sets_both_timestamps() {
        let contact = Contact::from_new(
            ContactId::new("c1"),
            NewContact::new("Agung", "agung@test.com", "081234567890"),
            42,
        );
        assert_eq!(contact.created_at, 42);
        assert_eq!(contact.updated_at, 42);
        assert_eq!(
            contact.fields(),
            NewContact::new("Agung", "agung@test.com", "081234567890")
        );
    }

    #[test]
    fn test_trimmed() {
        let fields = NewContact::new("  Agung ", "\tagung@test.com", "081234567890\n");
        assert_eq!(
            fields.trimmed(),
            NewContact::new("Agung", "agung@test.com", "081234567890")
        );
    }

    #[test]
    fn test_contact_id_serializes_transparently() {
        let json = serde_json::to_string(&ContactId::new("c1")).unwrap_or_default();
        assert_eq!(json, "\"c1\"");
    }
}
