//! HTTP route handlers.

pub mod export;
pub mod oracle;
pub mod redact;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use redline_core::Error;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(redact::routes())
        .merge(export::routes())
        .merge(oracle::routes())
}

/// GET / — liveness.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Redline redaction API is running" }))
}

/// HTTP status for an engine error.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Config(_) | Error::Extraction(_) => StatusCode::BAD_REQUEST,
        Error::OracleRateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        Error::OracleUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{"error": msg}` with the mapped status.
pub fn error_response(err: Error) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}
