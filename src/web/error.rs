//! Handler errors and their HTML pages.
//!
//! Handlers return [`AppError`]. Converting it into a response records the
//! page to show as a response extension; [`render_error_pages`] swaps in
//! the rendered HTML on the way out. If rendering itself fails the client
//! still gets the plain-text body.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;

use crate::Error;
use crate::observability::current_request_id;
use crate::rendering::{Page, PageRenderer};

/// An error surfaced to the browser.
#[derive(Debug)]
pub enum AppError {
    /// The addressed page or contact does not exist.
    NotFound(String),
    /// Something failed while serving the request.
    Internal(Error),
}

impl AppError {
    /// Creates a not-found error with a message for the page.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<Error> for AppError {
    fn from(error: Error) -> Self {
        match error {
            Error::NotFound(what) => Self::NotFound(format!("No {what} exists.")),
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let page = match self {
            Self::NotFound(message) => {
                tracing::debug!(%message, "Not found");
                ErrorPage::NotFound { message }
            },
            Self::Internal(error) => {
                metrics::counter!("http_request_failures_total").increment(1);
                tracing::error!(error = %error, "Request failed");
                ErrorPage::Internal
            },
        };

        let mut response = (page.status(), page.fallback_text()).into_response();
        response.extensions_mut().insert(page);
        response
    }
}

/// Error page awaiting rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPage {
    /// 404 with a message.
    NotFound {
        /// What was missing.
        message: String,
    },
    /// 500.
    Internal,
}

#[derive(Serialize)]
struct NotFoundPayload<'a> {
    title: &'static str,
    message: &'a str,
}

#[derive(Serialize)]
struct ErrorPayload {
    title: &'static str,
    request_id: Option<String>,
}

impl ErrorPage {
    /// Returns the status code for the page.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn fallback_text(&self) -> String {
        match self {
            Self::NotFound { message } => message.clone(),
            Self::Internal => "Internal Server Error".to_string(),
        }
    }

    fn render(&self, renderer: &PageRenderer) -> crate::Result<String> {
        match self {
            Self::NotFound { message } => renderer.render(
                Page::NotFound,
                &NotFoundPayload {
                    title: "Not Found",
                    message,
                },
            ),
            Self::Internal => renderer.render(
                Page::Error,
                &ErrorPayload {
                    title: "Error",
                    request_id: current_request_id(),
                },
            ),
        }
    }
}

/// Middleware that renders pending [`ErrorPage`]s as HTML.
pub async fn render_error_pages(
    State(renderer): State<Arc<PageRenderer>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(page) = response.extensions_mut().remove::<ErrorPage>() else {
        return response;
    };

    match page.render(&renderer) {
        Ok(html) => (page.status(), Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render error page");
            response
        },
    }
}

/// Fallback handler for unknown routes.
pub async fn not_found() -> AppError {
    AppError::not_found("The page you are looking for does not exist.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_404() {
        let error = AppError::from(Error::NotFound("contact with id 'x'".to_string()));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(matches!(
            response.extensions().get::<ErrorPage>(),
            Some(ErrorPage::NotFound { message }) if message == "No contact with id 'x' exists."
        ));
    }

    #[test]
    fn test_store_failure_maps_to_500() {
        let error = AppError::from(Error::OperationFailed {
            operation: "list_contacts".to_string(),
            cause: "disk I/O error".to_string(),
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.extensions().get::<ErrorPage>(),
            Some(&ErrorPage::Internal)
        );
    }

    #[test]
    fn test_error_pages_render() {
        let renderer = PageRenderer::new().unwrap();
        let html = ErrorPage::NotFound {
            message: "No contact named 'Nobody'.".to_string(),
        }
        .render(&renderer)
        .unwrap();
        assert!(html.contains("No contact named &#x27;Nobody&#x27;."));

        let html = ErrorPage::Internal.render(&renderer).unwrap();
        assert!(html.contains("Something went wrong"));
        assert!(!html.contains("disk I/O"));
    }
}
