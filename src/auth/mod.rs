/*!
 * # Authentication and Authorization Module
 *
 * JWT-based authentication for the Solentine API:
 *
 * - HS256 access tokens carrying the user id and role
 * - Argon2 password hashing
 * - Bearer-token middleware producing a typed [`AuthUser`] in request
 *   extensions, extractable in handlers
 * - Role middleware for admin-gated routes
 *
 * Handlers never parse tokens themselves; the middleware is the only place
 * the `Authorization` header is read.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::entities::user::{self, UserRole};
use crate::errors::ErrorResponse;

lazy_static::lazy_static! {
    static ref USERNAME_RE: regex::Regex = regex::Regex::new(r"^\w+$").unwrap();
}

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// User role embedded in the token payload
    pub role: String,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Authenticated identity extracted from a validated token.
///
/// This is the only representation of "who is calling" that reaches the
/// services; the raw token never travels past the middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Extract the authenticated identity placed in request extensions by
/// [`auth_middleware`]. Rejects with 401 when the middleware did not run or
/// did not authenticate the request.
#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, token_expiration: Duration) -> Self {
        Self {
            jwt_secret,
            token_expiration,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingAuth,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid authentication token")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Token creation failed: {0}")]
    TokenCreation(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("User already registered")]
    AlreadyRegistered,
    #[error("Hash error: {0}")]
    HashError(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "token not provided or not valid".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Unable to authenticate the user".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "token not provided or not valid".to_string(),
            ),
            Self::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string()),
            Self::UserNotFound => (StatusCode::UNAUTHORIZED, "User not found.".to_string()),
            Self::AlreadyRegistered => (StatusCode::CONFLICT, "User already registered".to_string()),
            Self::InsufficientPermissions => {
                (StatusCode::FORBIDDEN, "Insufficient permissions".to_string())
            }
            Self::TokenCreation(_) | Self::HashError(_) | Self::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = ErrorResponse {
            status: "error".to_string(),
            message,
            errors: None,
        };

        (status, Json(body)).into_response()
    }
}

/// Authentication service that handles signup, login and token validation
#[derive(Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Register a new user. Fails with `AlreadyRegistered` when the email is
    /// taken.
    #[instrument(skip(self, request))]
    pub async fn signup(&self, request: SignupRequest) -> Result<user::Model, AuthError> {
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(request.email.clone()))
            .one(&*self.db)
            .await?;

        if existing.is_some() {
            return Err(AuthError::AlreadyRegistered);
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();

        let new_user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(request.email),
            password_hash: Set(password_hash),
            username: Set(request.username),
            avatar: Set(request.avatar),
            first_name: Set(request.first_name),
            family_name: Set(request.family_name),
            role: Set(request.role.unwrap_or(UserRole::User)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(new_user.insert(&*self.db).await?)
    }

    /// Authenticate with email and password, returning a signed token.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: LoginCredentials) -> Result<LoginResponse, AuthError> {
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(credentials.email.clone()))
            .one(&*self.db)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&credentials.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let auth_token = self.generate_token(&user)?;
        Ok(LoginResponse {
            auth_token,
            user_id: user.id,
        })
    }

    /// Generate a signed access token for a user
    pub fn generate_token(&self, user: &user::Model) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + chrono::Duration::seconds(self.config.token_expiration.as_secs() as i64);

        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        Ok(claims)
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
    use argon2::Argon2;

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use argon2::Argon2;

    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Authentication middleware that validates the bearer token and inserts a
/// typed [`AuthUser`] into request extensions.
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let headers = request.headers().clone();

    match authenticate_from_headers(&headers, &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Role middleware for admin-gated routes; must run after [`auth_middleware`].
pub async fn role_middleware(
    State(required_role): State<UserRole>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingAuth)?;

    if user.role != required_role {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

fn authenticate_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let auth_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingAuth)?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingAuth)?
        .trim();

    let claims = auth_service.validate_token(token)?;
    debug!(sub = %claims.sub, "token verified");

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
    let role = claims
        .role
        .parse::<UserRole>()
        .map_err(|_| AuthError::InvalidToken)?;

    Ok(AuthUser { user_id, role })
}

/// Signup request body
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SignupRequest {
    #[validate(email(message = "Provide a valid email address."))]
    pub email: String,
    #[validate(length(min = 3, message = "Password too short."))]
    pub password: String,
    #[validate(
        length(min = 3, message = "Username needs at least 3 characters"),
        regex(path = "USERNAME_RE", message = "Username must be a single word")
    )]
    pub username: String,
    pub avatar: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "familyName")]
    pub family_name: Option<String>,
    pub role: Option<UserRole>,
}

/// Login request body
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Login response: signed token plus the user id for convenience
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth_token: String,
    pub user_id: Uuid,
}

/// Authentication routes: public signup/login plus token verification
pub fn auth_routes() -> axum::Router<crate::AppState> {
    axum::Router::new()
        .route("/signup", axum::routing::post(signup_handler))
        .route("/login", axum::routing::post(login_handler))
        .route("/verify", axum::routing::get(verify_handler))
}

/// Signup handler
pub async fn signup_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(request): Json<SignupRequest>,
) -> Result<impl IntoResponse, Response> {
    if let Err(e) = request.validate() {
        return Err(crate::errors::ServiceError::from(e).into_response());
    }

    let user = auth_service
        .signup(request)
        .await
        .map_err(IntoResponse::into_response)?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login handler
pub async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<LoginResponse>, AuthError> {
    let response = auth_service.login(credentials).await?;
    Ok(Json(response))
}

/// Returns the authenticated identity embedded in the presented token.
///
/// This route sits outside the `/api/v1` auth layer, so it validates the
/// header itself (it is the auth collaborator; handlers elsewhere never do
/// this).
pub async fn verify_handler(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AuthError> {
    let auth_user = authenticate_from_headers(&headers, &auth_service)?;
    Ok(Json(serde_json::json!({ "loggedUserData": auth_user })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> AuthService {
        // The connection is never touched by the token helpers under test.
        let db = Arc::new(DatabaseConnection::Disconnected);
        AuthService::new(
            AuthConfig::new(
                "test_secret_key_for_testing_purposes_only_32chars".into(),
                Duration::from_secs(6 * 60 * 60),
            ),
            db,
        )
    }

    fn test_user() -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            password_hash: String::new(),
            username: "ana".into(),
            avatar: None,
            first_name: None,
            family_name: None,
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let service = test_service();
        let user = test_user();

        let token = service.generate_token(&user).expect("token");
        let claims = service.validate_token(&token).expect("claims");

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, "USER");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = test_service();
        let user = test_user();

        let mut token = service.generate_token(&user).expect("token");
        token.push('x');

        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter2!").expect("hash");
        assert!(verify_password("hunter2!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn missing_bearer_prefix_is_unauthenticated() {
        let service = test_service();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());

        assert!(matches!(
            authenticate_from_headers(&headers, &service),
            Err(AuthError::MissingAuth)
        ));
    }

    #[test]
    fn valid_bearer_header_authenticates() {
        let service = test_service();
        let user = test_user();
        let token = service.generate_token(&user).expect("token");

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );

        let auth_user = authenticate_from_headers(&headers, &service).expect("auth user");
        assert_eq!(auth_user.user_id, user.id);
        assert_eq!(auth_user.role, UserRole::User);
    }
}
