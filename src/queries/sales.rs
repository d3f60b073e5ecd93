//! Sale query construction and paged execution.
//!
//! Translates untrusted request parameters into a sea-orm filter condition
//! and a compound ordering, then executes with count + offset/limit and
//! returns a complete envelope. Malformed input never produces a store-level
//! error: an unparseable `id` is dropped, a malformed reference identifier
//! degenerates to a condition matching nothing, and unrecognized sort
//! directives are ignored.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, IdenStatic, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::entities::sale;
use crate::errors::ServiceError;

/// Raw filter values exactly as supplied on the query string.
///
/// Every field is an opaque string at this point; parsing and validation
/// happen in [`build_filter`], never in the handler.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleFilterParams {
    pub id: Option<String>,
    pub year: Option<String>,
    pub business: Option<String>,
    pub zone: Option<String>,
    pub brand: Option<String>,
    pub client: Option<String>,
    pub comercial: Option<String>,
}

/// Raw sort directives, each formatted as `"<field>,<direction>"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleSortParams {
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "dateBy")]
    pub date_by: Option<String>,
    #[serde(rename = "idBy")]
    pub id_by: Option<String>,
}

/// Paged result envelope.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u64,
}

/// Translate the supplied filters into a single AND condition.
///
/// Recognized keys are mapped through an explicit enumeration; anything the
/// mapping does not know about simply does not reach this struct, so unknown
/// keys are ignored by construction.
pub fn build_filter(params: &SaleFilterParams) -> Condition {
    let mut condition = Condition::all();

    if let Some(raw) = params.id.as_deref() {
        // An unparseable id behaves as if the filter were absent.
        if let Ok(number) = raw.parse::<i64>() {
            condition = condition.add(sale::Column::SaleNumber.eq(number));
        }
    }

    if let Some(raw) = params.year.as_deref() {
        condition = condition.add(exact_year(raw));
    }

    if let Some(business) = params.business.as_deref() {
        condition = condition.add(sale::Column::Business.eq(business));
    }

    for (column, raw) in [
        (sale::Column::ZoneId, params.zone.as_deref()),
        (sale::Column::BrandId, params.brand.as_deref()),
        (sale::Column::ClientId, params.client.as_deref()),
        (sale::Column::ComercialId, params.comercial.as_deref()),
    ] {
        if let Some(raw) = raw {
            condition = condition.add(reference_filter(column, raw));
        }
    }

    condition
}

/// Exact-match year filter. A value that cannot name any stored year matches
/// nothing rather than erroring.
fn exact_year(raw: &str) -> Condition {
    match raw.trim().parse::<i32>() {
        Ok(year) => Condition::all().add(sale::Column::Year.eq(year)),
        Err(_) => match_nothing(),
    }
}

/// Equality filter on a reference column. A malformed identifier must not be
/// silently dropped (that would widen the result set) and must not crash the
/// query, so it degenerates to a condition matching nothing.
fn reference_filter(column: sale::Column, raw: &str) -> Condition {
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => Condition::all().add(column.eq(id)),
        Err(_) => match_nothing(),
    }
}

fn match_nothing() -> Condition {
    Condition::all().add(Expr::val(1).eq(0))
}

/// Combine the sort directives into a compound ordering.
///
/// Directives apply in `sortBy`, `dateBy`, `idBy` order; later directives add
/// secondary orderings and never override earlier ones. Malformed directives
/// are ignored. With no usable directive the listing falls back to newest
/// first.
pub fn build_sort(params: &SaleSortParams) -> Vec<(sale::Column, Order)> {
    let mut orderings: Vec<(sale::Column, Order)> = Vec::new();

    for raw in [
        params.sort_by.as_deref(),
        params.date_by.as_deref(),
        params.id_by.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        if let Some((column, order)) = parse_directive(raw) {
            let already_ordered = orderings
                .iter()
                .any(|(existing, _)| existing.as_str() == column.as_str());
            if !already_ordered {
                orderings.push((column, order));
            }
        }
    }

    if orderings.is_empty() {
        orderings.push((sale::Column::CreatedAt, Order::Desc));
    }

    orderings
}

/// Parse a single `"<field>,<direction>"` directive.
fn parse_directive(raw: &str) -> Option<(sale::Column, Order)> {
    let (field, direction) = raw.split_once(',')?;
    let column = sort_column(field.trim())?;
    let order = match direction.trim() {
        "asc" => Order::Asc,
        "desc" => Order::Desc,
        _ => return None,
    };
    Some((column, order))
}

/// Enumerated mapping from request field name to sortable column.
fn sort_column(name: &str) -> Option<sale::Column> {
    match name {
        "id" | "saleId" => Some(sale::Column::SaleNumber),
        "day" => Some(sale::Column::Day),
        "month" => Some(sale::Column::Month),
        "year" => Some(sale::Column::Year),
        "date" => Some(sale::Column::Date),
        "business" => Some(sale::Column::Business),
        "amount" => Some(sale::Column::Amount),
        "createdAt" => Some(sale::Column::CreatedAt),
        _ => None,
    }
}

/// `ceil(total_count / limit)`, with an empty result set yielding zero pages.
pub fn total_pages(total_count: u64, limit: u64) -> u64 {
    if total_count == 0 {
        0
    } else {
        (total_count + limit - 1) / limit
    }
}

/// Execute a built query with page/limit bounds.
///
/// Counts first, then short-circuits when the requested page lies beyond the
/// data so no fetch is wasted. Either the full envelope is returned or the
/// store error propagates; a partial result is never produced.
pub async fn execute_paged<C: ConnectionTrait>(
    db: &C,
    condition: Condition,
    sort: Vec<(sale::Column, Order)>,
    page: u64,
    limit: u64,
) -> Result<Page<sale::Model>, ServiceError> {
    let page = page.max(1);
    let limit = limit.max(1);
    let skip = (page - 1) * limit;

    let total_count = sale::Entity::find()
        .filter(condition.clone())
        .count(db)
        .await?;
    let total_pages = total_pages(total_count, limit);

    if skip >= total_count {
        debug!(page, limit, total_count, "requested page is beyond the data");
        return Ok(Page {
            items: Vec::new(),
            total_count,
            total_pages,
        });
    }

    let mut query = sale::Entity::find().filter(condition);
    for (column, order) in sort {
        query = query.order_by(column, order);
    }

    let items = query.offset(skip).limit(limit).all(db).await?;

    Ok(Page {
        items,
        total_count,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sea_orm::{DbBackend, QueryTrait};
    use test_case::test_case;

    fn filter_sql(params: &SaleFilterParams) -> String {
        sale::Entity::find()
            .filter(build_filter(params))
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn numeric_id_filters_on_sale_number() {
        let params = SaleFilterParams {
            id: Some("42".into()),
            ..Default::default()
        };
        let sql = filter_sql(&params);
        assert!(sql.contains("sale_number"));
        assert!(sql.contains("42"));
    }

    #[test]
    fn unparseable_id_is_silently_omitted() {
        let params = SaleFilterParams {
            id: Some("not-a-number".into()),
            ..Default::default()
        };
        let sql = filter_sql(&params);
        assert!(!sql.contains("sale_number"));
    }

    #[test]
    fn malformed_zone_reference_matches_nothing() {
        let params = SaleFilterParams {
            zone: Some("definitely-not-a-uuid".into()),
            ..Default::default()
        };
        let sql = filter_sql(&params);
        assert!(!sql.contains("zone_id"));
        assert!(sql.contains("1 = 0"));
    }

    #[test]
    fn well_formed_zone_reference_filters_on_column() {
        let params = SaleFilterParams {
            zone: Some(Uuid::new_v4().to_string()),
            ..Default::default()
        };
        let sql = filter_sql(&params);
        assert!(sql.contains("zone_id"));
        assert!(!sql.contains("1 = 0"));
    }

    #[test]
    fn filters_combine_with_and() {
        let params = SaleFilterParams {
            year: Some("2024".into()),
            business: Some("Panaderia Sol".into()),
            ..Default::default()
        };
        let sql = filter_sql(&params);
        assert!(sql.contains("year"));
        assert!(sql.contains("business"));
        assert!(sql.contains("AND"));
    }

    #[test]
    fn garbage_year_matches_nothing() {
        let params = SaleFilterParams {
            year: Some("twenty-twenty-four".into()),
            ..Default::default()
        };
        let sql = filter_sql(&params);
        assert!(sql.contains("1 = 0"));
    }

    fn describe(sort: &[(sale::Column, Order)]) -> Vec<(&str, &'static str)> {
        sort.iter()
            .map(|(column, order)| {
                let direction = match order {
                    Order::Asc => "asc",
                    Order::Desc => "desc",
                    _ => "other",
                };
                (column.as_str(), direction)
            })
            .collect()
    }

    #[test_case("amount,asc", Some(("amount", "asc")); "amount ascending")]
    #[test_case("date,desc", Some(("date", "desc")); "date descending")]
    #[test_case("saleId,asc", Some(("sale_number", "asc")); "sale id alias")]
    #[test_case("amount", None; "missing comma")]
    #[test_case("amount,sideways", None; "unknown direction")]
    #[test_case("favoriteColor,asc", None; "unknown field")]
    fn directive_parsing(raw: &str, expected: Option<(&str, &str)>) {
        let parsed = parse_directive(raw);
        let described = parsed
            .as_ref()
            .map(|pair| describe(std::slice::from_ref(pair))[0]);
        assert_eq!(described, expected);
    }

    #[test]
    fn directives_compound_without_overriding() {
        let params = SaleSortParams {
            sort_by: Some("amount,asc".into()),
            date_by: Some("date,desc".into()),
            id_by: Some("amount,desc".into()),
        };
        let sort = build_sort(&params);
        // The later `amount,desc` must not override the earlier ordering.
        assert_eq!(describe(&sort), vec![("amount", "asc"), ("date", "desc")]);
    }

    #[test]
    fn no_directives_fall_back_to_newest_first() {
        let sort = build_sort(&SaleSortParams::default());
        assert_eq!(describe(&sort), vec![("created_at", "desc")]);
    }

    #[test]
    fn malformed_directives_are_ignored() {
        let params = SaleSortParams {
            sort_by: Some("amount".into()),
            date_by: Some("date,upwards".into()),
            id_by: None,
        };
        let sort = build_sort(&params);
        assert_eq!(describe(&sort), vec![("created_at", "desc")]);
    }

    #[test]
    fn total_pages_of_empty_set_is_zero() {
        assert_eq!(total_pages(0, 100), 0);
    }

    #[test]
    fn total_pages_matches_worked_examples() {
        assert_eq!(total_pages(250, 100), 3);
        assert_eq!(total_pages(200, 100), 2);
        assert_eq!(total_pages(1, 100), 1);
    }

    proptest! {
        #[test]
        fn total_pages_is_ceiling_of_ratio(total in 0u64..1_000_000, limit in 1u64..10_000) {
            let pages = total_pages(total, limit);
            prop_assert_eq!(pages, (total as f64 / limit as f64).ceil() as u64);
            // Page count is always consistent with the count and limit.
            prop_assert!(pages * limit >= total);
            prop_assert!(pages == 0 || (pages - 1) * limit < total);
        }
    }
}
