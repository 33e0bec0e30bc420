//! Data models.

mod contact;

pub use contact::{Contact, ContactId, NewContact};
