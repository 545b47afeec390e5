//! API handlers for the signstamp server
//!
//! Provides REST endpoints for:
//! - PDF upload and retrieval behind short-lived tokens
//! - Placement suggestions
//! - Signature stamping and signed download

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use signstamp_core::{
    composite, is_pdf_candidate, suggest_with_defaults, NormalizedRect, SignDocument,
    SignatureImage,
};

use crate::error::ApiError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "signstamp-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Upload response
#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub pdf_token: String,
    pub pdf_url: String,
}

/// Handler: POST /upload
///
/// Accepts a raw `application/pdf` body. The `%PDF` pre-filter runs
/// before parsing; structural validity is established by actually opening
/// the document.
pub async fn handle_upload(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    state.store.sweep_expired();

    if body.is_empty() {
        return Err(ApiError::InvalidRequest("No file uploaded".to_string()));
    }
    if !is_pdf_candidate(&body) {
        return Err(ApiError::InvalidRequest(
            "Only PDF files are accepted".to_string(),
        ));
    }
    SignDocument::from_bytes(&body)?;

    let token = state.store.put(body.to_vec());
    info!(%token, bytes = body.len(), "stored uploaded PDF");

    Ok(Json(UploadResponse {
        success: true,
        pdf_url: format!("/pdf/{}", token),
        pdf_token: token,
    }))
}

/// Handler: GET /pdf/{token}
pub async fn handle_get_pdf(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state
        .store
        .get(&token)
        .ok_or_else(|| ApiError::NotFound("PDF".to_string()))?;
    Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes))
}

/// Suggest request body
#[derive(Deserialize)]
pub struct SuggestRequest {
    pub pdf_token: String,
}

/// Suggest response
#[derive(Serialize)]
pub struct SuggestResponse {
    pub success: bool,
    pub suggestions: Vec<NormalizedRect>,
}

/// Handler: POST /suggest
pub async fn handle_suggest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, ApiError> {
    state.store.sweep_expired();

    let bytes = state
        .store
        .get(&req.pdf_token)
        .ok_or_else(|| ApiError::NotFound("PDF".to_string()))?;
    // Stored bytes were parsed at upload time; failure here is ours.
    let doc = SignDocument::from_bytes(&bytes).map_err(|e| ApiError::Internal(e.to_string()))?;

    let suggestions = suggest_with_defaults(&doc);
    info!(
        token = %req.pdf_token,
        count = suggestions.len(),
        "computed placement suggestions"
    );

    Ok(Json(SuggestResponse {
        success: true,
        suggestions,
    }))
}

/// Sign request body
#[derive(Deserialize)]
pub struct SignRequest {
    pub pdf_token: String,
    /// Base64-encoded signature raster.
    pub signature: String,
    pub placements: Vec<NormalizedRect>,
}

/// Sign response
#[derive(Serialize)]
pub struct SignResponse {
    pub success: bool,
    pub signed_pdf_url: String,
}

/// Handler: POST /sign
pub async fn handle_sign(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignRequest>,
) -> Result<Json<SignResponse>, ApiError> {
    state.store.sweep_expired();

    if req.signature.is_empty() {
        return Err(ApiError::InvalidRequest(
            "Signature data missing".to_string(),
        ));
    }
    if req.placements.is_empty() {
        return Err(ApiError::InvalidRequest(
            "No target placements provided".to_string(),
        ));
    }

    let bytes = state
        .store
        .get(&req.pdf_token)
        .ok_or_else(|| ApiError::NotFound("PDF".to_string()))?;

    let sig_bytes = B64
        .decode(req.signature.as_bytes())
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid signature encoding: {}", e)))?;
    let signature = SignatureImage::from_bytes(&sig_bytes)?;
    debug!(
        width = signature.width(),
        height = signature.height(),
        placements = req.placements.len(),
        "decoded signature image"
    );

    let doc = SignDocument::from_bytes(&bytes).map_err(|e| ApiError::Internal(e.to_string()))?;
    let signed = composite(doc, &signature, &req.placements)?;

    // The signed bytes become the canonical content behind the token.
    if !state.store.replace(&req.pdf_token, signed) {
        return Err(ApiError::NotFound("PDF".to_string()));
    }
    info!(token = %req.pdf_token, "stamped signature into PDF");

    Ok(Json(SignResponse {
        success: true,
        signed_pdf_url: format!("/download/{}", req.pdf_token),
    }))
}

/// Handler: GET /download/{token}
pub async fn handle_download(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state
        .store
        .get(&token)
        .ok_or_else(|| ApiError::NotFound("Signed PDF".to_string()))?;
    let disposition = format!("attachment; filename=\"{}_signed.pdf\"", token);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
