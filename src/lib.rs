//! Solentine API Library
//!
//! REST API backing the Solentine sales tracking application: users
//! authenticate, manage sale records tied to zones, brands, clients and
//! commercial agents, and query sales with filtering, sorting and pagination.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod queries;
pub mod rate_limiter;
pub mod services;

use axum::{extract::FromRef, middleware, routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub auth: Arc<auth::AuthService>,
}

impl FromRef<AppState> for Arc<auth::AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Authenticated API surface under `/api/v1`.
///
/// Every route behind this router requires a valid bearer token; the auth
/// middleware inserts the typed identity the handlers extract.
pub fn api_v1_routes(auth_service: Arc<auth::AuthService>) -> Router<AppState> {
    Router::new()
        .nest("/sales", handlers::sales::sale_routes())
        .nest("/zones", handlers::zones::zone_routes())
        .nest("/brands", handlers::brands::brand_routes())
        .nest("/clients", handlers::clients::client_routes())
        .nest("/comercials", handlers::comercials::comercial_routes())
        .nest("/users", handlers::users::user_routes())
        .nest("/geocoding", handlers::geocoding::geocoding_routes())
        .layer(middleware::from_fn_with_state(
            auth_service,
            auth::auth_middleware,
        ))
}

/// Public routes: liveness banner and health probe.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Solentine API is running" }))
        .route("/health", get(handlers::health::health_check))
}
