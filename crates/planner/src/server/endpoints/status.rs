use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::info;

use crate::types::AppState;

/// GET /health
pub async fn get_health(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /health");

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "courses": s.catalog.len(),
        })),
    )
        .into_response()
}

/// GET /sessions/stats
///
/// Counts of live, expired and busy planning sessions.
pub async fn get_session_stats(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /sessions/stats");
    (StatusCode::OK, Json(s.sessions.stats())).into_response()
}
