use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{auth::AuthUser, errors::ServiceError, AppState};

#[derive(Debug, Deserialize)]
pub struct CoordinatesQuery {
    pub address: Option<String>,
}

/// Proxy a free-text address through the geocoding service, forwarding the
/// raw geocoder response body.
async fn get_coordinates(
    State(state): State<AppState>,
    Query(query): Query<CoordinatesQuery>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let address = query
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ServiceError::BadRequest("The \"address\" parameter is required".to_string()))?;

    let response = state.services.geocoding.get_coordinates(address).await?;
    Ok(Json(response))
}

pub fn geocoding_routes() -> Router<AppState> {
    Router::new().route("/coordinates", get(get_coordinates))
}
