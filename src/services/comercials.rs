use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::comercial;
use crate::errors::ServiceError;
use crate::services::map_write_err;

/// Typed comercial fields for the write paths.
#[derive(Debug, Clone)]
pub struct ComercialDraft {
    pub name: String,
    pub email: String,
}

/// Service for managing commercial agents
#[derive(Clone)]
pub struct ComercialService {
    db: Arc<DbPool>,
}

impl ComercialService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_comercials(&self) -> Result<Vec<comercial::Model>, ServiceError> {
        comercial::Entity::find()
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, draft))]
    pub async fn create_comercial(
        &self,
        draft: ComercialDraft,
    ) -> Result<comercial::Model, ServiceError> {
        let now = Utc::now();
        let model = comercial::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name),
            email: Set(draft.email),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(&*self.db)
            .await
            .map_err(|e| map_write_err(e, "name or email"))
    }

    #[instrument(skip(self, draft))]
    pub async fn update_comercial(
        &self,
        comercial_id: Uuid,
        draft: ComercialDraft,
    ) -> Result<comercial::Model, ServiceError> {
        let existing = comercial::Entity::find_by_id(comercial_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Comercial".to_string()))?;

        let mut model: comercial::ActiveModel = existing.into();
        model.name = Set(draft.name);
        model.email = Set(draft.email);
        model.updated_at = Set(Utc::now());

        model
            .update(&*self.db)
            .await
            .map_err(|e| map_write_err(e, "name or email"))
    }

    #[instrument(skip(self))]
    pub async fn delete_comercial(&self, comercial_id: Uuid) -> Result<(), ServiceError> {
        let result = comercial::Entity::delete_by_id(comercial_id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Comercial".to_string()));
        }
        Ok(())
    }
}
