use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::brand;
use crate::errors::ServiceError;
use crate::services::map_write_err;

/// Service for managing brands
#[derive(Clone)]
pub struct BrandService {
    db: Arc<DbPool>,
}

impl BrandService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_brands(&self) -> Result<Vec<brand::Model>, ServiceError> {
        brand::Entity::find()
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn create_brand(&self, name: String) -> Result<brand::Model, ServiceError> {
        let now = Utc::now();
        let model = brand::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(&*self.db)
            .await
            .map_err(|e| map_write_err(e, "name"))
    }

    #[instrument(skip(self))]
    pub async fn update_brand(
        &self,
        brand_id: Uuid,
        name: String,
    ) -> Result<brand::Model, ServiceError> {
        let existing = brand::Entity::find_by_id(brand_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Brand".to_string()))?;

        let mut model: brand::ActiveModel = existing.into();
        model.name = Set(name);
        model.updated_at = Set(Utc::now());

        model
            .update(&*self.db)
            .await
            .map_err(|e| map_write_err(e, "name"))
    }

    #[instrument(skip(self))]
    pub async fn delete_brand(&self, brand_id: Uuid) -> Result<(), ServiceError> {
        let result = brand::Entity::delete_by_id(brand_id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Brand".to_string()));
        }
        Ok(())
    }
}
