//! Listener lifecycle.

use axum::ServiceExt;
use axum::extract::Request;
use tokio::net::TcpListener;

use crate::config::ContactsConfig;
use crate::storage::ContactStorageFactory;
use crate::{Error, Result};

use super::{AppState, build_app};

/// Opens the configured store and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the address cannot be
/// bound, or the server fails.
pub async fn serve(config: &ContactsConfig) -> Result<()> {
    let backend = ContactStorageFactory::create(&config.storage)?;
    let app = build_app(AppState::new(backend, config)?);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "bind".to_string(),
            cause: format!("{addr}: {e}"),
        })?;
    let local = listener.local_addr().map_err(|e| Error::OperationFailed {
        operation: "bind".to_string(),
        cause: e.to_string(),
    })?;

    tracing::info!(address = %local, "Contacts listening at http://{local}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "serve".to_string(),
            cause: e.to_string(),
        })?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
