//! Business logic services.
//!
//! - [`validation`]: the ordered contact validation pipeline
//! - [`contact`]: async contact operations over a storage backend

mod contact;
pub mod validation;

pub use contact::{ContactService, SubmitOutcome};
pub use validation::{
    FieldError, NameCheck, ValidationErrors, Validator, is_valid_email, is_valid_mobile_phone,
};
