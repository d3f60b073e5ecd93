use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::zone;
use crate::errors::ServiceError;
use crate::services::geocoding::GeocodingService;
use crate::services::map_write_err;

/// Typed zone fields for the write paths.
#[derive(Debug, Clone)]
pub struct ZoneDraft {
    pub name: String,
    pub address: String,
}

/// Service for managing sales zones
#[derive(Clone)]
pub struct ZoneService {
    db: Arc<DbPool>,
    geocoding: Arc<GeocodingService>,
}

impl ZoneService {
    pub fn new(db: Arc<DbPool>, geocoding: Arc<GeocodingService>) -> Self {
        Self { db, geocoding }
    }

    #[instrument(skip(self))]
    pub async fn list_zones(&self) -> Result<Vec<zone::Model>, ServiceError> {
        zone::Entity::find()
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Create a zone; the address is geocoded before the row is persisted.
    /// An address the geocoder does not know yields a 400.
    #[instrument(skip(self, draft))]
    pub async fn create_zone(&self, draft: ZoneDraft) -> Result<zone::Model, ServiceError> {
        let position = self
            .geocoding
            .locate(&draft.address)
            .await?
            .ok_or_else(|| {
                ServiceError::BadRequest(
                    "No coordinates found for the provided address".to_string(),
                )
            })?;

        let now = Utc::now();
        let model = zone::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name),
            address: Set(draft.address),
            latitude: Set(position.latitude),
            longitude: Set(position.longitude),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model
            .insert(&*self.db)
            .await
            .map_err(|e| map_write_err(e, "name"))?;
        info!(zone_id = %created.id, "zone created");
        Ok(created)
    }

    /// Update a zone; the address is re-geocoded only when it changed.
    #[instrument(skip(self, draft))]
    pub async fn update_zone(
        &self,
        zone_id: Uuid,
        draft: ZoneDraft,
    ) -> Result<zone::Model, ServiceError> {
        let existing = zone::Entity::find_by_id(zone_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Zone".to_string()))?;

        let mut model: zone::ActiveModel = existing.clone().into();

        if draft.address != existing.address {
            let position = self.geocoding.locate(&draft.address).await?.ok_or_else(|| {
                ServiceError::BadRequest(
                    "No coordinates found for the provided address".to_string(),
                )
            })?;
            model.latitude = Set(position.latitude);
            model.longitude = Set(position.longitude);
        }

        model.name = Set(draft.name);
        model.address = Set(draft.address);
        model.updated_at = Set(Utc::now());

        model
            .update(&*self.db)
            .await
            .map_err(|e| map_write_err(e, "name"))
    }

    #[instrument(skip(self))]
    pub async fn delete_zone(&self, zone_id: Uuid) -> Result<(), ServiceError> {
        let result = zone::Entity::delete_by_id(zone_id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Zone".to_string()));
        }
        Ok(())
    }
}
