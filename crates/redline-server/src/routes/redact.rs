//! Redaction routes — /api/redact/*.

use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use redline_core::{Error, RedactionConfig};

use super::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/redact/text", post(redact_text))
        .route("/redact/file", post(redact_file))
        .route("/redact/pdf", post(redact_pdf))
}

#[derive(Debug, Deserialize)]
pub struct RedactTextRequest {
    pub text: String,
    #[serde(default)]
    pub redaction_settings: RedactionConfig,
}

/// POST /api/redact/text — redact a JSON-submitted document.
async fn redact_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RedactTextRequest>,
) -> Response {
    if req.text.trim().is_empty() {
        return error_response(Error::Extraction("no text provided".into()));
    }
    match state.redactor().redact(&req.text, &req.redaction_settings).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/redact/file — multipart upload, settings as query parameters.
/// The file type follows the upload's extension.
async fn redact_file(
    State(state): State<Arc<AppState>>,
    Query(settings): Query<RedactionConfig>,
    multipart: Multipart,
) -> Response {
    redact_upload(&state, &settings, multipart, None).await
}

/// POST /api/redact/pdf — as `/redact/file`, but the upload is always read as PDF.
async fn redact_pdf(
    State(state): State<Arc<AppState>>,
    Query(settings): Query<RedactionConfig>,
    multipart: Multipart,
) -> Response {
    redact_upload(&state, &settings, multipart, Some("pdf")).await
}

async fn redact_upload(
    state: &AppState,
    settings: &RedactionConfig,
    mut multipart: Multipart,
    force_ext: Option<&str>,
) -> Response {
    // Reject bad settings before touching the upload
    if let Err(e) = settings.validate() {
        return error_response(e);
    }

    let (filename, bytes) = loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let Some(name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                match field.bytes().await {
                    Ok(bytes) => break (name, bytes),
                    Err(e) => return error_response(Error::Extraction(format!("upload failed: {}", e))),
                }
            }
            Ok(None) => return error_response(Error::Extraction("no file in upload".into())),
            Err(e) => return error_response(Error::Extraction(format!("invalid multipart body: {}", e))),
        }
    };

    // Stage under a random name; keep the extension for type detection
    let ext = force_ext.unwrap_or_else(|| {
        std::path::Path::new(&filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("txt")
    });
    let staged = state
        .config
        .data_paths
        .uploads
        .join(format!("{}.{}", uuid::Uuid::new_v4(), ext));

    if let Err(e) = std::fs::write(&staged, &bytes) {
        return error_response(Error::Io(e));
    }
    let extracted = redline_ingest::extract(&staged);
    if let Err(e) = std::fs::remove_file(&staged) {
        tracing::warn!("Failed to remove staged upload {}: {}", staged.display(), e);
    }

    let text = match extracted {
        Ok(text) => text,
        Err(e) => return error_response(e),
    };

    match state.redactor().redact(&text, settings).await {
        Ok(outcome) => match serde_json::to_value(&outcome) {
            Ok(mut body) => {
                body["filename"] = serde_json::json!(filename);
                Json(body).into_response()
            }
            Err(e) => error_response(Error::Json(e)),
        },
        Err(e) => error_response(e),
    }
}
