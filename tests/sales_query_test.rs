mod common;

use rust_decimal::Decimal;
use solentine_api::queries::sales::{SaleFilterParams, SaleSortParams};

use common::{seed_sale, TestApp};

fn year_filter(year: &str) -> SaleFilterParams {
    SaleFilterParams {
        year: Some(year.to_string()),
        ..Default::default()
    }
}

fn sort_by(directive: &str) -> SaleSortParams {
    SaleSortParams {
        sort_by: Some(directive.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn sequential_pages_partition_the_result_set() {
    let app = TestApp::new().await;
    for n in 1..=25 {
        seed_sale(
            &app.state,
            app.user_id,
            n,
            2024,
            "Panaderia Sol",
            Decimal::new(n * 100, 2),
        )
        .await;
    }

    let sales = &app.state.services.sales;
    let full = sales
        .list_sales(&year_filter("2024"), &sort_by("amount,asc"), 1, 100)
        .await
        .expect("full listing");
    assert_eq!(full.items.len(), 25);

    let mut paged_ids = Vec::new();
    for page in 1..=3 {
        let result = sales
            .list_sales(&year_filter("2024"), &sort_by("amount,asc"), page, 10)
            .await
            .expect("page listing");
        assert_eq!(result.total_count, 25);
        assert_eq!(result.total_pages, 3);
        assert!(result.items.len() <= 10);
        paged_ids.extend(result.items.iter().map(|s| s.id));
    }

    // Concatenated pages equal the full sorted result set: no dups, no gaps.
    let full_ids: Vec<_> = full.items.iter().map(|s| s.id).collect();
    assert_eq!(paged_ids, full_ids);
}

#[tokio::test]
async fn worked_example_250_sales_three_pages() {
    let app = TestApp::new().await;
    for n in 1..=250 {
        seed_sale(
            &app.state,
            app.user_id,
            n,
            2024,
            "Ultramarinos Luz",
            Decimal::new(n * 37, 2),
        )
        .await;
    }
    // Noise from another year must not leak into the filtered set.
    for n in 1000..1030 {
        seed_sale(
            &app.state,
            app.user_id,
            n,
            2023,
            "Ultramarinos Luz",
            Decimal::new(n, 2),
        )
        .await;
    }

    let sales = &app.state.services.sales;

    let page2 = sales
        .list_sales(&year_filter("2024"), &sort_by("saleId,asc"), 2, 100)
        .await
        .expect("page 2");
    assert_eq!(page2.total_count, 250);
    assert_eq!(page2.total_pages, 3);
    assert_eq!(page2.items.len(), 100);
    let numbers: Vec<i64> = page2.items.iter().map(|s| s.sale_number).collect();
    assert_eq!(numbers, (101..=200).collect::<Vec<i64>>());

    let page3 = sales
        .list_sales(&year_filter("2024"), &sort_by("saleId,asc"), 3, 100)
        .await
        .expect("page 3");
    assert_eq!(page3.total_count, 250);
    assert_eq!(page3.total_pages, 3);
    assert_eq!(page3.items.len(), 50);

    let beyond = sales
        .list_sales(&year_filter("2024"), &sort_by("saleId,asc"), 4, 100)
        .await
        .expect("page beyond data");
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_count, 250);
    assert_eq!(beyond.total_pages, 3);
}

#[tokio::test]
async fn unknown_business_yields_empty_envelope() {
    let app = TestApp::new().await;
    seed_sale(&app.state, app.user_id, 1, 2024, "Bar Pepe", Decimal::new(1000, 2)).await;

    let result = app
        .state
        .services
        .sales
        .list_sales(
            &SaleFilterParams {
                business: Some("NoSuchBusiness".to_string()),
                ..Default::default()
            },
            &SaleSortParams::default(),
            1,
            100,
        )
        .await
        .expect("listing");

    assert!(result.items.is_empty());
    assert_eq!(result.total_count, 0);
    assert_eq!(result.total_pages, 0);
}

#[tokio::test]
async fn unparseable_id_filter_is_ignored() {
    let app = TestApp::new().await;
    for n in 1..=3 {
        seed_sale(&app.state, app.user_id, n, 2024, "Bar Pepe", Decimal::new(n, 0)).await;
    }

    let result = app
        .state
        .services
        .sales
        .list_sales(
            &SaleFilterParams {
                id: Some("not-a-number".to_string()),
                ..Default::default()
            },
            &SaleSortParams::default(),
            1,
            100,
        )
        .await
        .expect("listing");

    // Behaves exactly as if the id filter were absent.
    assert_eq!(result.total_count, 3);
}

#[tokio::test]
async fn malformed_zone_reference_yields_zero_results() {
    let app = TestApp::new().await;
    for n in 1..=3 {
        seed_sale(&app.state, app.user_id, n, 2024, "Bar Pepe", Decimal::new(n, 0)).await;
    }

    let result = app
        .state
        .services
        .sales
        .list_sales(
            &SaleFilterParams {
                zone: Some("definitely-not-a-reference".to_string()),
                ..Default::default()
            },
            &SaleSortParams::default(),
            1,
            100,
        )
        .await
        .expect("listing must not error");

    assert!(result.items.is_empty());
    assert_eq!(result.total_count, 0);
}

#[tokio::test]
async fn repeated_sort_produces_identical_order() {
    let app = TestApp::new().await;
    for n in 1..=12 {
        seed_sale(
            &app.state,
            app.user_id,
            n,
            2024,
            "Bar Pepe",
            Decimal::new((13 - n) * 55, 2),
        )
        .await;
    }

    let sales = &app.state.services.sales;
    let first = sales
        .list_sales(&SaleFilterParams::default(), &sort_by("amount,asc"), 1, 100)
        .await
        .expect("first listing");
    let second = sales
        .list_sales(&SaleFilterParams::default(), &sort_by("amount,asc"), 1, 100)
        .await
        .expect("second listing");

    let first_ids: Vec<_> = first.items.iter().map(|s| s.id).collect();
    let second_ids: Vec<_> = second.items.iter().map(|s| s.id).collect();
    assert_eq!(first_ids, second_ids);

    let amounts: Vec<_> = first.items.iter().map(|s| s.amount).collect();
    let mut sorted = amounts.clone();
    sorted.sort();
    assert_eq!(amounts, sorted);
}
