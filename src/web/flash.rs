//! One-shot flash messages handed across a redirect.
//!
//! A browser session is identified by an opaque cookie. Each session holds
//! at most one pending message; reading it removes it. Sessions live in a
//! bounded LRU and unread messages expire after a TTL.

use std::convert::Infallible;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use lru::LruCache;
use uuid::Uuid;

use crate::storage::sqlite::acquire_lock;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "contacts_session";

/// The caller's browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    is_new: bool,
}

impl Session {
    /// Starts a fresh session that the client does not know about yet.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            is_new: true,
        }
    }

    /// Reads the session cookie from request headers.
    ///
    /// Values that are not UUIDs are ignored.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
            .map(|id| Self {
                id: id.to_string(),
                is_new: false,
            })
    }

    /// Returns the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns true if the client has not been sent this session yet.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.is_new
    }

    /// Returns the `Set-Cookie` value that establishes this session.
    #[must_use]
    pub fn cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers).unwrap_or_else(Self::generate))
    }
}

struct FlashEntry {
    message: String,
    expires_at: Instant,
}

/// Per-session one-shot message store.
pub struct FlashStore {
    entries: Mutex<LruCache<String, FlashEntry>>,
    ttl: Duration,
}

impl FlashStore {
    /// Creates a store tracking at most `capacity` sessions.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Sets the pending message for a session, replacing any previous one.
    pub fn set(&self, session: &Session, message: impl Into<String>) {
        let entry = FlashEntry {
            message: message.into(),
            expires_at: Instant::now() + self.ttl,
        };
        if let Some((evicted, _)) = acquire_lock(&self.entries).push(session.id.clone(), entry)
            && evicted != session.id
        {
            tracing::debug!("Flash store full, evicted least recent session");
        }
    }

    /// Takes the pending message for a session, if any.
    ///
    /// The message is removed whether or not it has expired.
    #[must_use]
    pub fn take(&self, session: &Session) -> Option<String> {
        if session.is_new {
            return None;
        }
        let entry = acquire_lock(&self.entries).pop(&session.id)?;
        (entry.expires_at > Instant::now()).then_some(entry.message)
    }

    /// Returns the number of sessions holding a message.
    #[must_use]
    pub fn len(&self) -> usize {
        acquire_lock(&self.entries).len()
    }

    /// Returns true if no session holds a message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stores a flash message and redirects (303 See Other) to `to`.
///
/// Issues the session cookie when the session is new, so the message can be
/// found on the next request.
pub fn redirect_with_flash(
    flash: &FlashStore,
    session: &Session,
    to: &str,
    message: &str,
) -> Response {
    flash.set(session, message);

    let mut response = Redirect::to(to).into_response();
    if session.is_new
        && let Ok(cookie) = HeaderValue::from_str(&session.cookie())
    {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::http::header::LOCATION;

    fn known_session() -> Session {
        let mut headers = HeaderMap::new();
        let id = Uuid::new_v4();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}")).unwrap(),
        );
        Session::from_headers(&headers).unwrap()
    }

    #[test]
    fn test_session_from_cookie_header() {
        let session = known_session();
        assert!(!session.is_new());
        assert!(Uuid::parse_str(session.id()).is_ok());
    }

    #[test]
    fn test_session_ignores_garbage_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("contacts_session=not-a-uuid"),
        );
        assert!(Session::from_headers(&headers).is_none());
        assert!(Session::from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_take_is_read_once() {
        let store = FlashStore::new(16, Duration::from_secs(60));
        let session = known_session();

        store.set(&session, "Contact added.");
        assert_eq!(store.take(&session).as_deref(), Some("Contact added."));
        assert_eq!(store.take(&session), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_replaces_pending_message() {
        let store = FlashStore::new(16, Duration::from_secs(60));
        let session = known_session();

        store.set(&session, "first");
        store.set(&session, "second");
        assert_eq!(store.len(), 1);
        assert_eq!(store.take(&session).as_deref(), Some("second"));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = FlashStore::new(16, Duration::from_secs(60));
        let alice = known_session();
        let bob = known_session();

        store.set(&alice, "for alice");
        assert_eq!(store.take(&bob), None);
        assert_eq!(store.take(&alice).as_deref(), Some("for alice"));
    }

    #[test]
    fn test_expired_message_is_dropped() {
        let store = FlashStore::new(16, Duration::ZERO);
        let session = known_session();

        store.set(&session, "too late");
        assert_eq!(store.take(&session), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recent_session() {
        let store = FlashStore::new(2, Duration::from_secs(60));
        let (a, b, c) = (known_session(), known_session(), known_session());

        store.set(&a, "a");
        store.set(&b, "b");
        store.set(&c, "c");
        assert_eq!(store.len(), 2);
        assert_eq!(store.take(&a), None);
        assert_eq!(store.take(&c).as_deref(), Some("c"));
    }

    #[test]
    fn test_redirect_issues_cookie_for_new_session() {
        let store = FlashStore::new(16, Duration::from_secs(60));
        let session = Session::generate();

        let response = redirect_with_flash(&store, &session, "/contact", "Contact deleted.");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/contact");
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}={}", session.id())));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_redirect_keeps_existing_session() {
        let store = FlashStore::new(16, Duration::from_secs(60));
        let session = known_session();

        let response = redirect_with_flash(&store, &session, "/contact", "Contact edited.");
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(store.take(&session).as_deref(), Some("Contact edited."));
    }
}
