use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QuerySelect, Set};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::user::{self, UserRole};
use crate::errors::ServiceError;
use crate::services::map_write_err;

/// Fields an existing user account can change.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub avatar: Option<String>,
}

/// Service for managing user accounts (signup/login live in the auth module)
#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
}

impl UserService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<Vec<user::Model>, ServiceError> {
        let page = page.max(1);
        let limit = limit.max(1);

        user::Entity::find()
            .offset((page - 1) * limit)
            .limit(limit)
            .all(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<user::Model>, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, update))]
    pub async fn update_user(
        &self,
        user_id: Uuid,
        update: UserUpdate,
    ) -> Result<user::Model, ServiceError> {
        let existing = user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))?;

        let mut model: user::ActiveModel = existing.into();
        if let Some(username) = update.username {
            model.username = Set(username);
        }
        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(role) = update.role {
            model.role = Set(role);
        }
        if let Some(avatar) = update.avatar {
            model.avatar = Set(Some(avatar));
        }
        model.updated_at = Set(Utc::now());

        model
            .update(&*self.db)
            .await
            .map_err(|e| map_write_err(e, "email"))
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let result = user::Entity::delete_by_id(user_id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("User".to_string()));
        }
        Ok(())
    }
}
