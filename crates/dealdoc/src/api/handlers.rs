//! API request handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use base64::prelude::*;

use crate::DealdocError;
use crate::types::SourceFile;

use super::{
    error::ApiError,
    types::{ApiState, ExtractRequest, ExtractResponse, HealthResponse, InfoResponse},
};

/// Extract endpoint handler.
///
/// POST /extract
///
/// Accepts a JSON body with the base64-encoded file and its declared MIME
/// type. On success the cleaned text is returned and, when the server has a
/// document store and the request names a `documentId`, persisted. Failed
/// extractions are never persisted.
///
/// Request body size is capped at the router layer; oversized bodies are
/// rejected with 413 before reaching this handler.
pub async fn extract_handler(
    State(state): State<ApiState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(request) = payload?;

    if request.mime_type.trim().is_empty() {
        return Err(ApiError::bad_request("Missing required field: mimeType"));
    }

    let content = BASE64_STANDARD
        .decode(request.file_base64.trim())
        .map_err(|e| ApiError::validation(DealdocError::from(e)))?;

    tracing::debug!(
        mime_type = %request.mime_type,
        file_name = request.file_name.as_deref().unwrap_or(""),
        size = content.len(),
        "Extract request received"
    );

    let mut source = SourceFile::new(content, request.mime_type.as_str());
    if let Some(name) = &request.file_name {
        source = source.with_file_name(name.as_str());
    }
    if let Some(size) = request.file_size {
        source = source.with_declared_size(size);
    }

    let extracted = state
        .extractor
        .extract(&source)
        .await
        .into_result()
        .map_err(|failure| ApiError::from_failure(&failure))?;

    if let (Some(store), Some(document_id)) = (&state.store, request.document_id.as_deref()) {
        store
            .update_document_text(document_id, &extracted.text)
            .await
            .map_err(ApiError::internal)?;
        tracing::info!(document_id, "Persisted extracted text");
    }

    Ok(Json(ExtractResponse::new(extracted, request.file_name)))
}

/// Any method other than POST on /extract.
pub async fn method_not_allowed_handler() -> ApiError {
    ApiError::method_not_allowed()
}

/// Health check endpoint handler.
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Server info endpoint handler.
///
/// GET /info
pub async fn info_handler(State(state): State<ApiState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        supported_mime_types: state
            .extractor
            .supported_formats()
            .into_iter()
            .map(|format| format.mime_type().to_string())
            .collect(),
        persists_text: state.store.is_some(),
    })
}
