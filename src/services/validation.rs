//! Contact form validation.
//!
//! Checks run in a fixed order and every check runs, so a submission with
//! several problems reports all of them at once:
//!
//! 1. name: present, and not already taken (edits may keep their own name)
//! 2. email: `local@domain.tld` syntax
//! 3. phone: mobile-number format of the configured region

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::config::PhoneRegion;
use crate::models::{Contact, NewContact};

/// Message for a blank name.
pub const NAME_REQUIRED: &str = "Name is required.";
/// Message for a name that belongs to another contact.
pub const NAME_TAKEN: &str = "Contact name already exists.";
/// Message for a malformed email address.
pub const EMAIL_INVALID: &str = "Invalid email address.";
/// Message for a phone number that is not a mobile number of the region.
pub const PHONE_INVALID: &str = "Invalid mobile phone number.";

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_LOCAL_PART_LENGTH: usize = 64;

/// Dot-separated runs of RFC 5322 `atext`.
static LOCAL_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .unwrap_or_else(|_| unreachable!())
});

static DOMAIN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").unwrap_or_else(|_| unreachable!())
});

static TOP_LEVEL_DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,63}$").unwrap_or_else(|_| unreachable!()));

static PHONE_ID_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\+?62|0)8(1[123456789]|2[1238]|3[1238]|5[12356789]|7[78]|9[56789]|8[123456789])([\s?|\d]{5,11})$",
    )
    .unwrap_or_else(|_| unreachable!())
});

static PHONE_EN_US: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((\+1|1)?( |-)?)?(\([2-9][0-9]{2}\)|[2-9][0-9]{2})( |-)?([2-9][0-9]{2}( |-)?[0-9]{4})$",
    )
    .unwrap_or_else(|_| unreachable!())
});

static PHONE_EN_GB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+?44|0)7\d{9}$").unwrap_or_else(|_| unreachable!()));

static PHONE_MS_MY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+?60|0)1(([0145](-|\s)?\d{7,8})|([236-9](-|\s)?\d{7}))$")
        .unwrap_or_else(|_| unreachable!())
});

static PHONE_EN_SG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+65)?[3689]\d{7}$").unwrap_or_else(|_| unreachable!()));

/// A validation failure attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name (`name`, `email` or `phone`).
    pub field: &'static str,
    /// Human-readable message.
    pub message: String,
}

/// Ordered list of validation failures. Empty means the input is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Creates an empty error list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an error for a field.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Returns true if there are no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the messages in order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.message.as_str()).collect()
    }
}

/// How the name-uniqueness rule applies to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCheck<'a> {
    /// A new contact: any existing contact with the name is a conflict.
    Create,
    /// An edit: the contact may keep the name it had before the edit.
    Edit {
        /// The name the contact had when the edit form was rendered.
        old_name: &'a str,
    },
}

impl NameCheck<'_> {
    /// Returns true if `existing` makes `candidate` a duplicate.
    #[must_use]
    pub fn is_duplicate(&self, candidate: &str, existing: Option<&Contact>) -> bool {
        match (self, existing) {
            (_, None) => false,
            (Self::Create, Some(_)) => true,
            (Self::Edit { old_name }, Some(_)) => candidate != *old_name,
        }
    }
}

/// Validates contact submissions for one phone region.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    region: PhoneRegion,
}

impl Validator {
    /// Creates a validator for the given phone region.
    #[must_use]
    pub const fn new(region: PhoneRegion) -> Self {
        Self { region }
    }

    /// Runs every check against `fields`.
    ///
    /// `existing` is the stored contact whose name equals `fields.name`, if
    /// any. The caller looks it up; this function does no I/O.
    #[must_use]
    pub fn validate(
        &self,
        fields: &NewContact,
        existing: Option<&Contact>,
        check: NameCheck<'_>,
    ) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if fields.name.trim().is_empty() {
            errors.push("name", NAME_REQUIRED);
        } else if check.is_duplicate(&fields.name, existing) {
            errors.push("name", NAME_TAKEN);
        }

        if !is_valid_email(&fields.email) {
            errors.push("email", EMAIL_INVALID);
        }

        if !is_valid_mobile_phone(&fields.phone, self.region) {
            errors.push("phone", PHONE_INVALID);
        }

        errors
    }
}

/// Returns true if `email` has valid `local@domain.tld` syntax.
///
/// # Examples
///
/// ```rust
/// use contacts::services::is_valid_email;
///
/// assert!(is_valid_email("a@b.com"));
/// assert!(!is_valid_email("a@b"));
/// assert!(!is_valid_email("a.@b.com"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LENGTH {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > MAX_LOCAL_PART_LENGTH || !LOCAL_PART.is_match(local) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };

    !rest.is_empty()
        && TOP_LEVEL_DOMAIN.is_match(tld)
        && rest.iter().all(|label| DOMAIN_LABEL.is_match(label))
}

/// Returns true if `phone` is a mobile number in the region's format.
///
/// # Examples
///
/// ```rust
/// use contacts::PhoneRegion;
/// use contacts::services::is_valid_mobile_phone;
///
/// assert!(is_valid_mobile_phone("081234567890", PhoneRegion::Indonesia));
/// assert!(!is_valid_mobile_phone("021234567", PhoneRegion::Indonesia));
/// ```
#[must_use]
pub fn is_valid_mobile_phone(phone: &str, region: PhoneRegion) -> bool {
    phone_pattern(region).is_match(phone)
}

fn phone_pattern(region: PhoneRegion) -> &'static Regex {
    match region {
        PhoneRegion::Indonesia => &*PHONE_ID_ID,
        PhoneRegion::UnitedStates => &*PHONE_EN_US,
        PhoneRegion::UnitedKingdom => &*PHONE_EN_GB,
        PhoneRegion::Malaysia => &*PHONE_MS_MY,
        PhoneRegion::Singapore => &*PHONE_EN_SG,
    }
}
