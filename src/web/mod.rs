//! HTTP surface.
//!
//! [`build_app`] assembles the router, its middleware stack and the method
//! override into one service. [`serve`] binds it to the configured address.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/` | landing page |
//! | GET | `/about` | about page |
//! | GET | `/contact` | contact list plus pending flash |
//! | GET | `/contact/add` | add form |
//! | POST | `/contact` | create |
//! | PUT | `/contact` | update (via `?_method=PUT`) |
//! | DELETE | `/contact` | delete (via `?_method=DELETE`) |
//! | GET | `/contact/edit/{name}` | edit form |
//! | GET | `/contact/{name}` | detail page |
//! | GET | `/public/style.css` | stylesheet |

mod error;
mod flash;
mod handlers;
mod method_override;
mod server;

pub use error::{AppError, ErrorPage};
pub use flash::{FlashStore, SESSION_COOKIE, Session, redirect_with_flash};
pub use handlers::{
    AddContactForm, DeleteContactForm, EditContactForm, FLASH_ADDED, FLASH_DELETED, FLASH_EDITED,
    SAMPLE_PEOPLE,
};
pub use method_override::{METHOD_PARAM, override_method};
pub use server::serve;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use tower::Layer;
use tower::util::{MapRequest, MapRequestLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::config::ContactsConfig;
use crate::observability::{RequestContext, scope_request_context};
use crate::rendering::PageRenderer;
use crate::services::{ContactService, Validator};
use crate::storage::ContactBackend;
use crate::Result;

/// Response header carrying the request correlation ID.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// The assembled application: the router behind the method override.
pub type App = MapRequest<Router, fn(Request) -> Request>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Contact operations.
    pub contacts: ContactService,
    /// Page templates.
    pub renderer: Arc<PageRenderer>,
    /// Per-session flash messages.
    pub flash: Arc<FlashStore>,
    body_limit: usize,
}

impl AppState {
    /// Creates handler state over a contact store.
    ///
    /// # Errors
    ///
    /// Returns an error if a page template fails to compile.
    pub fn new(backend: Arc<dyn ContactBackend>, config: &ContactsConfig) -> Result<Self> {
        let validator = Validator::new(config.validation.phone_region);
        Ok(Self {
            contacts: ContactService::new(backend, validator),
            renderer: Arc::new(PageRenderer::new()?),
            flash: Arc::new(FlashStore::new(
                config.session.max_sessions,
                Duration::from_secs(config.session.flash_ttl_secs),
            )),
            body_limit: config.server.body_limit,
        })
    }
}

/// Builds the application service.
///
/// Layers, outermost first: method override, HTTP tracing, security
/// headers, request ID, error page rendering, body size limit.
pub fn build_app(state: AppState) -> App {
    let renderer = Arc::clone(&state.renderer);
    let body_limit = state.body_limit;

    let router = Router::new()
        .route("/", get(handlers::home))
        .route("/about", get(handlers::about))
        .route(
            "/contact",
            get(handlers::list_contacts)
                .post(handlers::create_contact)
                .put(handlers::update_contact)
                .delete(handlers::delete_contact),
        )
        .route("/contact/add", get(handlers::add_form))
        .route("/contact/edit/{name}", get(handlers::edit_form))
        .route("/contact/{name}", get(handlers::contact_detail))
        .route("/public/style.css", get(handlers::stylesheet))
        .fallback(error::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(
            renderer,
            error::render_error_pages,
        ))
        .layer(middleware::from_fn(request_context))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'self'; frame-ancestors 'none'"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http());

    MapRequestLayer::new(override_method as fn(Request) -> Request).layer(router)
}

/// Longest caller-supplied request ID that is reused.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Returns the caller's request ID if it is short and header-safe.
fn incoming_request_id(request: &Request) -> Option<&str> {
    let value = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let valid = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    valid.then_some(value)
}

/// Runs each request inside a correlation scope and echoes its ID.
///
/// A well-formed `x-request-id` from the caller is kept; otherwise a new ID
/// is generated.
async fn request_context(request: Request, next: Next) -> Response {
    let context = incoming_request_id(&request)
        .map_or_else(RequestContext::new, RequestContext::from_id);
    let request_id = context.request_id().to_string();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = scope_request_context(context, next.run(request))
        .instrument(span)
        .await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
