//! Export routes — /api/export/*.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use redline_ingest::{export_name, render_bytes, OutputFormat};

use super::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/export/text", post(export_text))
        .route("/export/pdf", post(export_pdf))
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub redacted_text: String,
}

/// POST /api/export/text — redacted text as a downloadable `.txt`.
async fn export_text(Json(req): Json<ExportRequest>) -> Response {
    attachment(&req.redacted_text, OutputFormat::Text)
}

/// POST /api/export/pdf — redacted text laid out as a downloadable PDF.
async fn export_pdf(Json(req): Json<ExportRequest>) -> Response {
    attachment(&req.redacted_text, OutputFormat::Pdf)
}

/// Rendered in memory; nothing is left in the exports directory.
fn attachment(redacted_text: &str, format: OutputFormat) -> Response {
    let bytes = match render_bytes(redacted_text, format) {
        Ok(bytes) => bytes,
        Err(e) => return error_response(e),
    };
    (
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_name(format)),
            ),
        ],
        bytes,
    )
        .into_response()
}
