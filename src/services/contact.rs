//! Contact service.
//!
//! Async facade over a [`ContactBackend`] used by the web handlers. Store
//! calls are synchronous `SQLite` work, so each one runs on the blocking
//! thread pool and the calling handler suspends until it completes.
//!
//! # Example
//!
//! ```rust,ignore
//! use contacts::services::{ContactService, SubmitOutcome, Validator};
//! use contacts::storage::ContactStorageFactory;
//!
//! let service = ContactService::new(ContactStorageFactory::create_in_memory()?, Validator::default());
//! match service.create(NewContact::new("Agung", "agung@test.com", "081234567890")).await? {
//!     SubmitOutcome::Saved(contact) => println!("saved {}", contact.id),
//!     SubmitOutcome::Invalid(errors) => println!("{:?}", errors.messages()),
//! }
//! ```

use std::sync::Arc;

use crate::models::{Contact, ContactId, NewContact};
use crate::storage::ContactBackend;
use crate::{Error, Result};

use super::validation::{NAME_TAKEN, NameCheck, ValidationErrors, Validator};

/// Result of an add or edit submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The contact was written.
    Saved(Contact),
    /// Validation failed; nothing was written.
    Invalid(ValidationErrors),
}

/// Service for contact operations.
#[derive(Clone)]
pub struct ContactService {
    backend: Arc<dyn ContactBackend>,
    validator: Validator,
}

impl ContactService {
    /// Creates a new contact service.
    #[must_use]
    pub fn new(backend: Arc<dyn ContactBackend>, validator: Validator) -> Self {
        Self { backend, validator }
    }

    /// Runs a store operation on the blocking thread pool.
    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&dyn ContactBackend) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || f(backend.as_ref()))
            .await
            .map_err(|e| Error::OperationFailed {
                operation: operation.to_string(),
                cause: e.to_string(),
            })?
    }

    /// Lists all contacts.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn list(&self) -> Result<Vec<Contact>> {
        self.run("list_contacts", |backend| backend.list()).await
    }

    /// Finds a contact by exact name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn find_by_name(&self, name: impl Into<String>) -> Result<Option<Contact>> {
        let name = name.into();
        self.run("find_contact_by_name", move |backend| backend.get_by_name(&name))
            .await
    }

    /// Runs the validation pipeline, including the name lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the name lookup fails.
    pub async fn validate(
        &self,
        fields: &NewContact,
        check: NameCheck<'_>,
    ) -> Result<ValidationErrors> {
        let existing = if fields.name.trim().is_empty() {
            None
        } else {
            self.find_by_name(fields.name.clone()).await?
        };

        let errors = self.validator.validate(fields, existing.as_ref(), check);
        if !errors.is_empty() {
            metrics::counter!("contact_validation_failures_total").increment(1);
            tracing::debug!(errors = ?errors.messages(), "Contact submission rejected");
        }
        Ok(errors)
    }

    /// Validates and inserts a new contact.
    ///
    /// Fields are trimmed before validation. A name collision reported by
    /// the store (a concurrent insert won the race) becomes a validation
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails for any other reason.
    pub async fn create(&self, fields: NewContact) -> Result<SubmitOutcome> {
        let fields = fields.trimmed();
        let errors = self.validate(&fields, NameCheck::Create).await?;
        if !errors.is_empty() {
            return Ok(SubmitOutcome::Invalid(errors));
        }

        let inserted = self
            .run("insert_contact", move |backend| backend.insert(fields))
            .await;

        match inserted {
            Ok(contact) => {
                metrics::counter!("contacts_created_total").increment(1);
                tracing::info!(contact_id = %contact.id, name = %contact.name, "Contact added");
                Ok(SubmitOutcome::Saved(contact))
            },
            Err(Error::DuplicateName { name }) => {
                tracing::info!(%name, "Contact name taken by concurrent insert");
                Ok(SubmitOutcome::Invalid(name_taken()))
            },
            Err(e) => Err(e),
        }
    }

    /// Validates and replaces the fields of an existing contact.
    ///
    /// `old_name` is the name the contact had when the edit form was
    /// rendered; keeping it does not count as a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no contact has `id`, or an error if
    /// the store fails.
    pub async fn update(
        &self,
        id: ContactId,
        old_name: &str,
        fields: NewContact,
    ) -> Result<SubmitOutcome> {
        let fields = fields.trimmed();
        let errors = self
            .validate(&fields, NameCheck::Edit { old_name: old_name.trim() })
            .await?;
        if !errors.is_empty() {
            return Ok(SubmitOutcome::Invalid(errors));
        }

        let write_id = id.clone();
        let updated = self
            .run("update_contact", move |backend| backend.update(&write_id, fields))
            .await;

        match updated {
            Ok(Some(contact)) => {
                metrics::counter!("contacts_updated_total").increment(1);
                tracing::info!(contact_id = %contact.id, name = %contact.name, "Contact edited");
                Ok(SubmitOutcome::Saved(contact))
            },
            Ok(None) => Err(Error::NotFound(format!("contact with id '{id}'"))),
            Err(Error::DuplicateName { name }) => {
                tracing::info!(%name, "Contact name taken by concurrent write");
                Ok(SubmitOutcome::Invalid(name_taken()))
            },
            Err(e) => Err(e),
        }
    }

    /// Deletes the contact with the given name.
    ///
    /// Deleting a name that does not exist is a no-op.
    ///
    /// # Returns
    ///
    /// True if a contact was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn delete_by_name(&self, name: impl Into<String>) -> Result<bool> {
        let name = name.into();
        let lookup = name.clone();
        let deleted = self
            .run("delete_contact", move |backend| backend.delete_by_name(&lookup))
            .await?;

        if deleted {
            metrics::counter!("contacts_deleted_total").increment(1);
            tracing::info!(%name, "Contact deleted");
        } else {
            tracing::debug!(%name, "Delete matched no contact");
        }
        Ok(deleted)
    }
}

fn name_taken() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.push("name", NAME_TAKEN);
    errors
}
