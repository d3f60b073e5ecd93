pub mod brands;
pub mod clients;
pub mod comercials;
pub mod common;
pub mod geocoding;
pub mod health;
pub mod sales;
pub mod security;
pub mod users;
pub mod zones;

use crate::db::DbPool;
use crate::services;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub sales: Arc<services::sales::SaleService>,
    pub zones: Arc<services::zones::ZoneService>,
    pub brands: Arc<services::brands::BrandService>,
    pub clients: Arc<services::clients::ClientService>,
    pub comercials: Arc<services::comercials::ComercialService>,
    pub users: Arc<services::users::UserService>,
    pub geocoding: Arc<services::geocoding::GeocodingService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, geocoding: Arc<services::geocoding::GeocodingService>) -> Self {
        Self {
            sales: Arc::new(services::sales::SaleService::new(db.clone())),
            zones: Arc::new(services::zones::ZoneService::new(
                db.clone(),
                geocoding.clone(),
            )),
            brands: Arc::new(services::brands::BrandService::new(db.clone())),
            clients: Arc::new(services::clients::ClientService::new(
                db.clone(),
                geocoding.clone(),
            )),
            comercials: Arc::new(services::comercials::ComercialService::new(db.clone())),
            users: Arc::new(services::users::UserService::new(db)),
            geocoding,
        }
    }
}
