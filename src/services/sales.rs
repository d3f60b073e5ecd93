use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{sale, user, user_sale};
use crate::errors::ServiceError;
use crate::queries::sales::{
    build_filter, build_sort, execute_paged, Page, SaleFilterParams, SaleSortParams,
};

/// Typed sale fields as accepted by the write paths. Field-level validation
/// happens on the request DTO before this struct is built.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub sale_number: i64,
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub date: String,
    pub business: String,
    pub amount: Decimal,
    pub zone_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub comercial_id: Option<Uuid>,
}

/// Service for managing sales
#[derive(Clone)]
pub struct SaleService {
    db: Arc<DbPool>,
}

impl SaleService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// List sales matching the supplied filters, sorted and paged.
    ///
    /// Pure read path: filter/sort translation is delegated to the query
    /// builder, execution to the paged wrapper.
    #[instrument(skip(self, filters, sorts))]
    pub async fn list_sales(
        &self,
        filters: &SaleFilterParams,
        sorts: &SaleSortParams,
        page: u64,
        limit: u64,
    ) -> Result<Page<sale::Model>, ServiceError> {
        let condition = build_filter(filters);
        let sort = build_sort(sorts);
        execute_paged(&*self.db, condition, sort, page, limit).await
    }

    /// Get a sale by its record id
    #[instrument(skip(self))]
    pub async fn get_sale(&self, sale_id: Uuid) -> Result<Option<sale::Model>, ServiceError> {
        sale::Entity::find_by_id(sale_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Create a sale on behalf of the authenticated creator.
    ///
    /// The sale row and the creator's back-reference index entry are written
    /// in one transaction, so the index cannot drift from the source of
    /// truth.
    #[instrument(skip(self, draft))]
    pub async fn create_sale(
        &self,
        draft: SaleDraft,
        creator: Uuid,
    ) -> Result<sale::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let creator_exists = user::Entity::find_by_id(creator).one(&txn).await?.is_some();
        if !creator_exists {
            return Err(ServiceError::NotFound("User".to_string()));
        }

        let now = Utc::now();
        let model = sale::ActiveModel {
            id: Set(Uuid::new_v4()),
            sale_number: Set(draft.sale_number),
            day: Set(draft.day),
            month: Set(draft.month),
            year: Set(draft.year),
            date: Set(draft.date),
            business: Set(draft.business),
            amount: Set(draft.amount),
            zone_id: Set(draft.zone_id),
            brand_id: Set(draft.brand_id),
            client_id: Set(draft.client_id),
            comercial_id: Set(draft.comercial_id),
            created_by: Set(creator),
            updated_by: Set(None),
            deleted_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(&txn).await?;

        user_sale::ActiveModel {
            user_id: Set(creator),
            sale_id: Set(created.id),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(sale_id = %created.id, sale_number = created.sale_number, "sale created");
        Ok(created)
    }

    /// Update a sale's fields, recording the last updater.
    #[instrument(skip(self, draft))]
    pub async fn update_sale(
        &self,
        sale_id: Uuid,
        draft: SaleDraft,
        updater: Uuid,
    ) -> Result<sale::Model, ServiceError> {
        let existing = sale::Entity::find_by_id(sale_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Sale".to_string()))?;

        let mut model: sale::ActiveModel = existing.into();
        model.sale_number = Set(draft.sale_number);
        model.day = Set(draft.day);
        model.month = Set(draft.month);
        model.year = Set(draft.year);
        model.date = Set(draft.date);
        model.business = Set(draft.business);
        model.amount = Set(draft.amount);
        model.zone_id = Set(draft.zone_id);
        model.brand_id = Set(draft.brand_id);
        model.client_id = Set(draft.client_id);
        model.comercial_id = Set(draft.comercial_id);
        model.updated_by = Set(Some(updater));
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    /// Delete a sale, removing the creator's back-reference in the same
    /// transaction.
    #[instrument(skip(self))]
    pub async fn delete_sale(&self, sale_id: Uuid) -> Result<(), ServiceError> {
        let existing = sale::Entity::find_by_id(sale_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Sale".to_string()))?;

        let txn = self.db.begin().await?;

        user_sale::Entity::delete_many()
            .filter(user_sale::Column::SaleId.eq(existing.id))
            .exec(&txn)
            .await?;

        sale::Entity::delete_by_id(existing.id).exec(&txn).await?;

        txn.commit().await?;

        info!(sale_id = %sale_id, "sale deleted");
        Ok(())
    }
}
