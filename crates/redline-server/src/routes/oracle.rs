//! Judge routes — status and provider configuration.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use redline_oracle::OracleConfigUpdate;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/oracle/status", get(get_status))
        .route("/oracle/config", get(get_config).put(update_config))
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let redactor = state.redactor();
    let config = state.oracle_config.read();
    let resolved = config.resolve_provider();

    Json(serde_json::json!({
        "oracle": redactor.oracle_name(),
        "oracleAvailable": resolved.is_some(),
        "provider": resolved.as_ref().map(|(p, _, _)| p.to_string()),
        "model": resolved.as_ref().map(|(_, m, _)| m.clone()),
        "requireOracle": state.config.require_oracle,
    }))
}

async fn get_config(State(state): State<Arc<AppState>>) -> Json<redline_oracle::OracleConfigResponse> {
    Json(state.oracle_config.read().to_response())
}

async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<OracleConfigUpdate>,
) -> Response {
    let response = {
        let mut config = state.oracle_config.write();
        config.apply_update(&update);

        if let Err(e) = config.save() {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": format!("Failed to save config: {}", e) })),
            )
                .into_response();
        }
        config.to_response()
    };

    state.rebuild_redactor();
    Json(response).into_response()
}
