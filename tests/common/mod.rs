#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use solentine_api::{
    auth::{AuthConfig, AuthService, SignupRequest},
    config::AppConfig,
    db::{self, DbConfig},
    entities::{sale, user::UserRole},
    handlers::AppServices,
    services::geocoding::GeocodingService,
    AppState,
};

const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Helper harness for spinning up an application backed by an in-memory
/// SQLite database. Single-connection pool so every query sees the same
/// database.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub auth_service: Arc<AuthService>,
    pub user_id: Uuid,
    token: String,
}

impl TestApp {
    /// Construct a test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_geocoder("http://127.0.0.1:59999/geocode".to_string()).await
    }

    /// Same, but pointing the geocoding client at a caller-controlled base
    /// URL (a wiremock server in tests).
    pub async fn with_geocoder(geocoding_base_url: String) -> Self {
        let db_cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db = Arc::new(pool);

        let auth_service = Arc::new(AuthService::new(
            AuthConfig::new(TEST_JWT_SECRET.to_string(), Duration::from_secs(21_600)),
            db.clone(),
        ));

        let geocoding = Arc::new(GeocodingService::new(
            geocoding_base_url,
            Some("test-key".to_string()),
        ));

        let config = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            21_600,
            "127.0.0.1".to_string(),
            5005,
            "test".to_string(),
        );

        let services = AppServices::new(db.clone(), geocoding);
        let state = AppState {
            db,
            config,
            services,
            auth: auth_service.clone(),
        };

        let router = solentine_api::public_routes()
            .nest(
                "/api/v1",
                solentine_api::api_v1_routes(auth_service.clone()),
            )
            .nest("/auth", solentine_api::auth::auth_routes())
            .with_state(state.clone());

        // Seed an admin user and mint a token for authenticated requests
        let seeded = auth_service
            .signup(SignupRequest {
                email: "tester@example.com".to_string(),
                password: "secret123".to_string(),
                username: "tester".to_string(),
                avatar: None,
                first_name: None,
                family_name: None,
                role: Some(UserRole::Admin),
            })
            .await
            .expect("failed to seed test user");
        let token = auth_service
            .generate_token(&seeded)
            .expect("failed to mint test token");

        Self {
            router,
            state,
            auth_service,
            user_id: seeded.id,
            token,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Fire a request without credentials.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.send(method, uri, body, None).await
    }

    /// Fire a request carrying the seeded user's bearer token.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.send(method, uri, body, Some(self.token.clone())).await
    }

    /// Fire a request carrying an arbitrary bearer token.
    pub async fn request_with_token(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: &str,
    ) -> Response {
        self.send(method, uri, body, Some(token.to_string())).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<String>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request construction");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request dispatch")
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}

/// Insert a sale row directly, bypassing the service layer, for read-path
/// tests that need a precisely shaped dataset.
pub async fn seed_sale(
    state: &AppState,
    creator: Uuid,
    sale_number: i64,
    year: i32,
    business: &str,
    amount: Decimal,
) -> sale::Model {
    let now = Utc::now();
    sale::ActiveModel {
        id: Set(Uuid::new_v4()),
        sale_number: Set(sale_number),
        day: Set(15),
        month: Set(6),
        year: Set(year),
        date: Set(format!("15/06/{year}")),
        business: Set(business.to_string()),
        amount: Set(amount),
        zone_id: Set(None),
        brand_id: Set(None),
        client_id: Set(None),
        comercial_id: Set(None),
        created_by: Set(creator),
        updated_by: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&*state.db)
    .await
    .expect("seed sale")
}
