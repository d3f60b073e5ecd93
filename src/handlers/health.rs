use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use crate::{db, AppState};

/// Liveness/readiness probe. The service reports healthy even when the
/// database is momentarily unreachable, since the pool reconnects on its own;
/// the `database` field tells the two states apart.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "database": database,
        "healthy": true,
    }))
}
