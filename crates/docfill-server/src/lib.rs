//! HTTP surface for docfill
//!
//! - `POST /api/upload?filename=<name>`: raw `.docx` body, returns the record
//! - `POST /api/download`: `{documentId, placeholders}`, returns the filled file
//! - `GET /api/documents/:id`: the stored record
//! - `GET /health`
//!
//! Service calls touch the filesystem and run on the blocking pool.

mod error;
mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use docfill_core::{DocumentStore, DownloadService, ServiceError, Settings, UploadService};

pub use error::ApiError;
pub use handlers::*;

/// Largest accepted upload body
pub const UPLOAD_LIMIT: usize = 25 * 1024 * 1024;

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub upload: Arc<UploadService>,
    pub download: Arc<DownloadService>,
}

impl AppState {
    pub fn new(upload: UploadService, download: DownloadService) -> Self {
        Self {
            upload: Arc::new(upload),
            download: Arc::new(download),
        }
    }

    /// Both services over one store
    pub fn from_store(store: DocumentStore, include_headers_footers: bool) -> Self {
        Self::new(
            UploadService::new(store.clone()).with_headers_footers(include_headers_footers),
            DownloadService::new(store),
        )
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ServiceError> {
        let store = DocumentStore::open(&settings.store.root)?;
        Ok(Self::from_store(store, settings.scan.include_headers_footers))
    }
}

/// Build the API router with all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/upload", post(upload_document))
        .route("/api/download", post(download_document))
        .route("/api/documents/:id", get(get_document))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn start_server(addr: &str, state: AppState) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutting down");
}
