use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::client;
use crate::errors::ServiceError;
use crate::services::geocoding::GeocodingService;
use crate::services::map_write_err;

/// Typed client fields for the write paths.
#[derive(Debug, Clone)]
pub struct ClientDraft {
    pub name: String,
    pub email: String,
    pub address: String,
}

/// Service for managing clients
#[derive(Clone)]
pub struct ClientService {
    db: Arc<DbPool>,
    geocoding: Arc<GeocodingService>,
}

impl ClientService {
    pub fn new(db: Arc<DbPool>, geocoding: Arc<GeocodingService>) -> Self {
        Self { db, geocoding }
    }

    #[instrument(skip(self))]
    pub async fn list_clients(&self) -> Result<Vec<client::Model>, ServiceError> {
        client::Entity::find()
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn get_client_by_name(
        &self,
        name: &str,
    ) -> Result<Option<client::Model>, ServiceError> {
        client::Entity::find()
            .filter(client::Column::Name.eq(name))
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Create a client; the address is geocoded before the row is persisted.
    #[instrument(skip(self, draft))]
    pub async fn create_client(&self, draft: ClientDraft) -> Result<client::Model, ServiceError> {
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
        let model = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name),
            email: Set(draft.email),
            address: Set(draft.address),
            latitude: Set(position.latitude),
            longitude: Set(position.longitude),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model
            .insert(&*self.db)
            .await
            .map_err(|e| map_write_err(e, "name or email"))?;
        info!(client_id = %created.id, "client created");
        Ok(created)
    }

    /// Update a client; the address is re-geocoded only when it changed.
    #[instrument(skip(self, draft))]
    pub async fn update_client(
        &self,
        client_id: Uuid,
        draft: ClientDraft,
    ) -> Result<client::Model, ServiceError> {
        let existing = client::Entity::find_by_id(client_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Client".to_string()))?;

        let mut model: client::ActiveModel = existing.clone().into();

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
        model.email = Set(draft.email);
        model.address = Set(draft.address);
        model.updated_at = Set(Utc::now());

        model
            .update(&*self.db)
            .await
            .map_err(|e| map_write_err(e, "name or email"))
    }

    #[instrument(skip(self))]
    pub async fn delete_client(&self, client_id: Uuid) -> Result<(), ServiceError> {
        let result = client::Entity::delete_by_id(client_id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Client".to_string()));
        }
        Ok(())
    }
}
