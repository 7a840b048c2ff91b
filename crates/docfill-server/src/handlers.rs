//! Request handlers

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use docfill_core::{DocumentRecord, DownloadRequest, ServiceError};
use serde::Deserialize;

use crate::error::{ApiError, DOWNLOAD, LOOKUP, UPLOAD};
use crate::AppState;

/// Query string of an upload
#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    /// Original file name; must end in `.docx`
    pub filename: Option<String>,
}

pub async fn health_check() -> &'static str {
    "ok"
}

/// `POST /api/upload?filename=<name>`
pub async fn upload_document(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<DocumentRecord>, ApiError> {
    let file_name = params.filename.unwrap_or_default();
    let upload = state.upload.clone();

    let record = run_blocking(move || upload.upload(&file_name, &body))
        .await
        .map_err(|e| ApiError::from_service(e, UPLOAD))?;
    Ok(Json(record))
}

/// `POST /api/download`
pub async fn download_document(
    State(state): State<AppState>,
    request: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected download body");
        ApiError::new(StatusCode::BAD_REQUEST, "Invalid request body")
    })?;
    let download = state.download.clone();

    let filled = run_blocking(move || download.download(&request))
        .await
        .map_err(|e| ApiError::from_service(e, DOWNLOAD))?;

    let disposition = format!("attachment; filename=\"{}\"", filled.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, filled.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        filled.bytes,
    )
        .into_response())
}

/// `GET /api/documents/:id`
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentRecord>, ApiError> {
    let upload = state.upload.clone();

    let record = run_blocking(move || upload.store().load_record(&id))
        .await
        .map_err(|e| ApiError::from_service(e, LOOKUP))?;
    Ok(Json(record))
}

/// Run a filesystem-bound service call off the async workers
async fn run_blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Internal(format!("service task failed: {e}")))?
}
