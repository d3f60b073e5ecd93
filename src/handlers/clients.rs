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
    services::clients::ClientDraft,
    AppState,
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ClientRequest {
    #[validate(length(min = 1, message = "Client name is required"))]
    pub name: String,
    #[validate(email(message = "Provide a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

impl From<ClientRequest> for ClientDraft {
    fn from(request: ClientRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            address: request.address,
        }
    }
}

async fn list_clients(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let clients = state.services.clients.list_clients().await?;
    Ok(Json(clients))
}

async fn get_client_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state
        .services
        .clients
        .get_client_by_name(&name)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Client".to_string()))?;
    Ok(Json(client))
}

async fn create_client(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<ClientRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let created = state.services.clients.create_client(request.into()).await?;
    Ok(created_response(created))
}

async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<ClientRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let updated = state
        .services
        .clients
        .update_client(id, request.into())
        .await?;
    Ok(Json(updated))
}

async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.clients.delete_client(id).await?;
    Ok(Json(json!({ "message": "Client deleted" })))
}

pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients))
        .route("/", post(create_client))
        .route("/by-name/:name", get(get_client_by_name))
        .route("/:id", put(update_client))
        .route("/:id", delete(delete_client))
}
