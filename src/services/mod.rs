//! Business logic services used by the HTTP handlers.

pub mod brands;
pub mod clients;
pub mod comercials;
pub mod geocoding;
pub mod sales;
pub mod users;
pub mod zones;

use crate::errors::ServiceError;
use sea_orm::{DbErr, SqlErr};

/// Map a write error, surfacing unique-key violations as conflicts so the
/// handler layer can answer 409 instead of 500.
pub(crate) fn map_write_err(err: DbErr, what: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict(format!("{what} already exists"))
        }
        _ => ServiceError::DatabaseError(err),
    }
}
