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
    AppState,
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct BrandRequest {
    #[validate(length(min = 1, message = "Brand name is required"))]
    pub name: String,
}

async fn list_brands(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let brands = state.services.brands.list_brands().await?;
    Ok(Json(brands))
}

async fn create_brand(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<BrandRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let created = state.services.brands.create_brand(request.name).await?;
    Ok(created_response(created))
}

async fn update_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<BrandRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let updated = state.services.brands.update_brand(id, request.name).await?;
    Ok(Json(updated))
}

async fn delete_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.brands.delete_brand(id).await?;
    Ok(Json(json!({ "message": "Brand deleted" })))
}

pub fn brand_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_brands))
        .route("/", post(create_brand))
        .route("/:id", put(update_brand))
        .route("/:id", delete(delete_brand))
}
