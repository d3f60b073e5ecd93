use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::{created_response, validate_input},
    services::zones::ZoneDraft,
    AppState,
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ZoneRequest {
    #[validate(length(min = 1, message = "Zone name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

impl From<ZoneRequest> for ZoneDraft {
    fn from(request: ZoneRequest) -> Self {
        Self {
            name: request.name,
            address: request.address,
        }
    }
}

async fn list_zones(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let zones = state.services.zones.list_zones().await?;
    Ok(Json(zones))
}

async fn create_zone(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<ZoneRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let created = state.services.zones.create_zone(request.into()).await?;
    Ok(created_response(created))
}

async fn update_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<ZoneRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let updated = state
        .services
        .zones
        .update_zone(id, request.into())
        .await?;
    Ok(Json(updated))
}

async fn delete_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.zones.delete_zone(id).await?;
    Ok(Json(json!({ "message": "Zone deleted" })))
}

pub fn zone_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_zones))
        .route("/", post(create_zone))
        .route("/:id", put(update_zone))
        .route("/:id", delete(delete_zone))
}
