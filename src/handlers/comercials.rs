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
    services::comercials::ComercialDraft,
    AppState,
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ComercialRequest {
    #[validate(length(min = 1, message = "Comercial name is required"))]
    pub name: String,
    #[validate(email(message = "Provide a valid email address."))]
    pub email: String,
}

impl From<ComercialRequest> for ComercialDraft {
    fn from(request: ComercialRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
        }
    }
}

async fn list_comercials(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let comercials = state.services.comercials.list_comercials().await?;
    Ok(Json(comercials))
}

async fn create_comercial(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<ComercialRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let created = state
        .services
        .comercials
        .create_comercial(request.into())
        .await?;
    Ok(created_response(created))
}

async fn update_comercial(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<ComercialRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let updated = state
        .services
        .comercials
        .update_comercial(id, request.into())
        .await?;
    Ok(Json(updated))
}

async fn delete_comercial(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.comercials.delete_comercial(id).await?;
    Ok(Json(json!({ "message": "Comercial deleted" })))
}

pub fn comercial_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_comercials))
        .route("/", post(create_comercial))
        .route("/:id", put(update_comercial))
        .route("/:id", delete(delete_comercial))
}
