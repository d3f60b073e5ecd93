use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    auth::AuthUser,
    entities::sale,
    errors::ServiceError,
    handlers::common::{created_response, validate_input, PaginationParams},
    queries::sales::{SaleFilterParams, SaleSortParams},
    services::sales::SaleDraft,
    AppState,
};

lazy_static::lazy_static! {
    static ref DATE_RE: regex::Regex = regex::Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap();
}

/// Query parameters accepted by the sales listing.
///
/// Filter and sort values stay raw strings here; the query builder owns all
/// parsing so malformed values degrade instead of rejecting the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SalesListQuery {
    pub id: Option<String>,
    pub year: Option<String>,
    pub business: Option<String>,
    pub zone: Option<String>,
    pub brand: Option<String>,
    pub client: Option<String>,
    pub comercial: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "dateBy")]
    pub date_by: Option<String>,
    #[serde(rename = "idBy")]
    pub id_by: Option<String>,
}

impl SalesListQuery {
    fn filters(&self) -> SaleFilterParams {
        SaleFilterParams {
            id: self.id.clone(),
            year: self.year.clone(),
            business: self.business.clone(),
            zone: self.zone.clone(),
            brand: self.brand.clone(),
            client: self.client.clone(),
            comercial: self.comercial.clone(),
        }
    }

    fn sorts(&self) -> SaleSortParams {
        SaleSortParams {
            sort_by: self.sort_by.clone(),
            date_by: self.date_by.clone(),
            id_by: self.id_by.clone(),
        }
    }
}

/// Sale as exposed over the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: Uuid,
    pub sale_id: i64,
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub date: String,
    pub business: String,
    pub amount: Decimal,
    pub zone: Option<Uuid>,
    pub brand: Option<Uuid>,
    pub client: Option<Uuid>,
    pub comercial: Option<Uuid>,
    pub created_by: Uuid,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<sale::Model> for SaleResponse {
    fn from(model: sale::Model) -> Self {
        Self {
            id: model.id,
            sale_id: model.sale_number,
            day: model.day,
            month: model.month,
            year: model.year,
            date: model.date,
            business: model.business,
            amount: model.amount,
            zone: model.zone_id,
            brand: model.brand_id,
            client: model.client_id,
            comercial: model.comercial_id,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Paged listing envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesPageResponse {
    pub sales: Vec<SaleResponse>,
    pub total_sales: u64,
    pub total_pages: u64,
}

/// Sale fields accepted on create and update. The creator is always the
/// authenticated identity, never a body field.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SaleRequest {
    #[serde(rename = "saleId")]
    pub sale_id: i64,
    #[validate(range(min = 1, max = 31, message = "Day must be between 1 and 31"))]
    pub day: i32,
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: i32,
    #[validate(range(min = 2000, max = 2100, message = "Year must be between 2000 and 2100"))]
    pub year: i32,
    #[validate(regex(path = "DATE_RE", message = "Date must be in DD/MM/YYYY format"))]
    pub date: String,
    #[validate(length(min = 1, max = 100, message = "Business name must be between 1 and 100 characters"))]
    pub business: String,
    #[validate(custom = "validate_amount")]
    pub amount: Decimal,
    pub zone: Option<String>,
    pub brand: Option<String>,
    pub client: Option<String>,
    pub comercial: Option<String>,
}

fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() {
        let mut err = ValidationError::new("amount");
        err.message = Some("Amount must be positive".into());
        return Err(err);
    }
    Ok(())
}

impl SaleRequest {
    /// Body reference identifiers must be well-formed; unlike query filters,
    /// a malformed reference on a write is a validation error.
    fn into_draft(self) -> Result<SaleDraft, ServiceError> {
        Ok(SaleDraft {
            sale_number: self.sale_id,
            day: self.day,
            month: self.month,
            year: self.year,
            date: self.date,
            business: self.business,
            amount: self.amount,
            zone_id: parse_reference("zone", self.zone.as_deref())?,
            brand_id: parse_reference("brand", self.brand.as_deref())?,
            client_id: parse_reference("client", self.client.as_deref())?,
            comercial_id: parse_reference("comercial", self.comercial.as_deref())?,
        })
    }
}

fn parse_reference(name: &str, raw: Option<&str>) -> Result<Option<Uuid>, ServiceError> {
    match raw {
        None => Ok(None),
        Some(value) => Uuid::parse_str(value.trim()).map(Some).map_err(|_| {
            ServiceError::ValidationError(format!("{name} must be a valid reference identifier"))
        }),
    }
}

/// List sales with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    summary = "List sales",
    description = "List sales with filtering, sorting and pagination. Unparseable filter values degrade (dropped or zero-result) instead of erroring.",
    params(PaginationParams, SalesListQuery),
    responses(
        (status = 200, description = "Paged sales listing", body = SalesPageResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_sales(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<SalesListQuery>,
    _user: AuthUser,
) -> Result<Json<SalesPageResponse>, ServiceError> {
    let result = state
        .services
        .sales
        .list_sales(
            &query.filters(),
            &query.sorts(),
            pagination.page,
            pagination.limit,
        )
        .await?;

    Ok(Json(SalesPageResponse {
        sales: result.items.into_iter().map(SaleResponse::from).collect(),
        total_sales: result.total_count,
        total_pages: result.total_pages,
    }))
}

/// Fetch a single sale by record id
#[utoipa::path(
    get,
    path = "/api/v1/sales/{id}",
    summary = "Get sale",
    params(("id" = String, Path, description = "Sale record id")),
    responses(
        (status = 200, description = "The sale", body = SaleResponse),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
    _user: AuthUser,
) -> Result<Json<SaleResponse>, ServiceError> {
    // An id that is not even well formed can name no sale: 404, not 400.
    let sale_id =
        Uuid::parse_str(&id).map_err(|_| ServiceError::NotFound("Sale".to_string()))?;

    let sale = state
        .services
        .sales
        .get_sale(sale_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Sale".to_string()))?;

    Ok(Json(SaleResponse::from(sale)))
}

/// Create a sale owned by the authenticated user
#[utoipa::path(
    post,
    path = "/api/v1/sales",
    summary = "Create sale",
    request_body = SaleRequest,
    responses(
        (status = 201, description = "Sale created", body = SaleResponse),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SaleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let draft = request.into_draft()?;

    let created = state
        .services
        .sales
        .create_sale(draft, user.user_id)
        .await?;

    Ok(created_response(SaleResponse::from(created)))
}

/// Update a sale, recording the authenticated user as last updater
pub async fn update_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    Json(request): Json<SaleRequest>,
) -> Result<Json<SaleResponse>, ServiceError> {
    let sale_id =
        Uuid::parse_str(&id).map_err(|_| ServiceError::NotFound("Sale".to_string()))?;

    validate_input(&request)?;
    let draft = request.into_draft()?;

    let updated = state
        .services
        .sales
        .update_sale(sale_id, draft, user.user_id)
        .await?;

    Ok(Json(SaleResponse::from(updated)))
}

/// Delete a sale
pub async fn delete_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
    _user: AuthUser,
) -> Result<StatusCode, ServiceError> {
    let sale_id =
        Uuid::parse_str(&id).map_err(|_| ServiceError::NotFound("Sale".to_string()))?;

    state.services.sales.delete_sale(sale_id).await?;

    Ok(StatusCode::OK)
}

pub fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales))
        .route("/", post(create_sale))
        .route("/:id", get(get_sale))
        .route("/:id", put(update_sale))
        .route("/:id", delete(delete_sale))
}
