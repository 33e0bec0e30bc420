//! Property-based tests for contacts.
//!
//! Uses proptest to verify invariants across random inputs:
//! - `ContactId` preserves its input
//! - Trimming submitted fields is idempotent
//! - Valid submissions are stored and flashed exactly once
//! - Names that differ only by surrounding whitespace collide

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use contacts::config::PhoneRegion;
use contacts::models::{ContactId, NewContact};
use contacts::services::{ContactService, SubmitOutcome, Validator};
use contacts::storage::ContactStorageFactory;
use contacts::web::{FlashStore, Session, redirect_with_flash};
use proptest::prelude::*;
use std::time::Duration;

fn service() -> ContactService {
    ContactService::new(
        ContactStorageFactory::create_in_memory().unwrap(),
        Validator::new(PhoneRegion::Indonesia),
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

prop_compose! {
    fn valid_contact()(
        name in "[A-Za-z][A-Za-z ]{0,20}[A-Za-z]",
        local in "[a-z][a-z0-9]{0,10}",
        domain in "[a-z]{2,10}",
        tld in prop::sample::select(vec!["com", "org", "id", "net"]),
        digits in "[0-9]{7,9}",
    ) -> NewContact {
        NewContact::new(name, format!("{local}@{domain}.{tld}"), format!("0812{digits}"))
    }
}

proptest! {
    /// Property: `ContactId` preserves input string exactly.
    #[test]
    fn prop_contact_id_preserves_string(s in "[a-f0-9]{1,32}") {
        let id = ContactId::new(&s);
        prop_assert_eq!(id.as_str(), s.as_str());
        prop_assert_eq!(id.to_string(), s);
    }

    /// Property: trimming is idempotent.
    #[test]
    fn prop_trimmed_is_idempotent(
        name in "\\s{0,3}[a-z]{0,8}\\s{0,3}",
        email in "\\s{0,3}[a-z@.]{0,8}\\s{0,3}",
        phone in "\\s{0,3}[0-9+]{0,8}\\s{0,3}",
    ) {
        let once = NewContact::new(name, email, phone).trimmed();
        prop_assert_eq!(once.trimmed(), once);
    }

    /// Property: a valid submission is stored once and listed.
    #[test]
    fn prop_valid_submission_is_stored(fields in valid_contact()) {
        let rt = runtime();
        rt.block_on(async {
            let service = service();
            let outcome = service.create(fields.clone()).await.unwrap();
            let SubmitOutcome::Saved(contact) = outcome else {
                panic!("rejected {fields:?}");
            };

            let listed = service.list().await.unwrap();
            assert_eq!(listed, vec![contact]);
            assert_eq!(listed[0].fields(), fields);
        });
    }

    /// Property: whitespace around a taken name still collides.
    #[test]
    fn prop_padded_duplicate_is_rejected(fields in valid_contact(), pad in "[ \t]{1,3}") {
        let rt = runtime();
        rt.block_on(async {
            let service = service();
            assert!(matches!(
                service.create(fields.clone()).await.unwrap(),
                SubmitOutcome::Saved(_)
            ));

            let padded = NewContact::new(
                format!("{pad}{}{pad}", fields.name),
                fields.email.clone(),
                fields.phone.clone(),
            );
            assert!(matches!(
                service.create(padded).await.unwrap(),
                SubmitOutcome::Invalid(_)
            ));
            assert_eq!(service.list().await.unwrap().len(), 1);
        });
    }

    /// Property: a flash is delivered exactly once, whatever the message.
    #[test]
    fn prop_flash_is_read_once(message in ".{1,40}") {
        let store = FlashStore::new(8, Duration::from_secs(60));
        let session = Session::generate();
        let response = redirect_with_flash(&store, &session, "/contact", &message);

        let cookie = response.headers()[axum::http::header::SET_COOKIE].clone();
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(axum::http::header::COOKIE, cookie);
        let returning = Session::from_headers(&headers).unwrap();

        prop_assert_eq!(store.take(&returning), Some(message));
        prop_assert_eq!(store.take(&returning), None);
    }
}
