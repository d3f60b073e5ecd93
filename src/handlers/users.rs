use axum::{
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{role_middleware, AuthUser},
    entities::user::UserRole,
    errors::ServiceError,
    handlers::common::validate_input,
    services::users::UserUpdate,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, message = "Username needs at least 3 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Provide a valid email address."))]
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub avatar: Option<String>,
}

async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let users = state
        .services
        .users
        .list_users(query.page.unwrap_or(1), query.limit.unwrap_or(10))
        .await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state
        .services
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User".to_string()))?;
    Ok(Json(user))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let updated = state
        .services
        .users
        .update_user(
            id,
            UserUpdate {
                username: request.username,
                email: request.email,
                role: request.role,
                avatar: request.avatar,
            },
        )
        .await?;
    Ok(Json(updated))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.users.delete_user(id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

/// User routes; deletion is admin-gated.
pub fn user_routes() -> Router<AppState> {
    let admin_only = Router::new()
        .route("/:id", delete(delete_user))
        .route_layer(middleware::from_fn_with_state(
            UserRole::Admin,
            role_middleware,
        ));

    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route("/:id", put(update_user))
        .merge(admin_only)
}
