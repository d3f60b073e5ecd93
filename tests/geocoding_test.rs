mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solentine_api::errors::ServiceError;
use solentine_api::services::geocoding::GeocodingService;

use common::{body_json, TestApp};

fn ok_body(lat: f64, lng: f64) -> serde_json::Value {
    json!({
        "status": "OK",
        "results": [
            {
                "formatted_address": "Calle Mayor 1, Madrid",
                "geometry": { "location": { "lat": lat, "lng": lng } }
            }
        ]
    })
}

async fn mock_geocoder(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .and(query_param("key", "test-key"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn locate_returns_first_candidate() {
    let server = MockServer::start().await;
    mock_geocoder(&server, ResponseTemplate::new(200).set_body_json(ok_body(40.4168, -3.7038)))
        .await;

    let service = GeocodingService::new(format!("{}/geocode", server.uri()), Some("test-key".into()));
    let coordinates = service
        .locate("Calle Mayor 1, Madrid")
        .await
        .expect("geocoding succeeds")
        .expect("coordinates present");

    assert!((coordinates.latitude - 40.4168).abs() < f64::EPSILON);
    assert!((coordinates.longitude - (-3.7038)).abs() < f64::EPSILON);
}

#[tokio::test]
async fn zero_results_is_a_clean_none() {
    let server = MockServer::start().await;
    mock_geocoder(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "status": "ZERO_RESULTS", "results": [] })),
    )
    .await;

    let service = GeocodingService::new(format!("{}/geocode", server.uri()), Some("test-key".into()));
    let coordinates = service
        .locate("Nowhere In Particular 999")
        .await
        .expect("zero results is not an error");
    assert!(coordinates.is_none());
}

#[tokio::test]
async fn upstream_denial_surfaces_as_external_error() {
    let server = MockServer::start().await;
    mock_geocoder(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "results": [],
            "error_message": "The provided API key is invalid."
        })),
    )
    .await;

    let service = GeocodingService::new(format!("{}/geocode", server.uri()), Some("test-key".into()));
    let error = service
        .locate("Calle Mayor 1, Madrid")
        .await
        .expect_err("denial must error");
    assert!(matches!(error, ServiceError::ExternalApiError(_)));
}

#[tokio::test]
async fn missing_api_key_fails_without_calling_upstream() {
    let service = GeocodingService::new("http://127.0.0.1:59999/geocode".into(), None);
    let error = service
        .locate("Calle Mayor 1, Madrid")
        .await
        .expect_err("missing key must error");
    assert!(matches!(error, ServiceError::InternalError(_)));
}

#[tokio::test]
async fn zone_create_persists_geocoded_position() {
    let server = MockServer::start().await;
    mock_geocoder(&server, ResponseTemplate::new(200).set_body_json(ok_body(41.3874, 2.1686)))
        .await;

    let app = TestApp::with_geocoder(format!("{}/geocode", server.uri())).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/zones",
            Some(json!({ "name": "Barcelona Centro", "address": "Plaça de Catalunya, Barcelona" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["name"], "Barcelona Centro");
    assert!((body["latitude"].as_f64().expect("latitude") - 41.3874).abs() < 1e-9);
    assert!((body["longitude"].as_f64().expect("longitude") - 2.1686).abs() < 1e-9);
}

#[tokio::test]
async fn zone_create_with_unknown_address_is_rejected() {
    let server = MockServer::start().await;
    mock_geocoder(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "status": "ZERO_RESULTS", "results": [] })),
    )
    .await;

    let app = TestApp::with_geocoder(format!("{}/geocode", server.uri())).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/zones",
            Some(json!({ "name": "Atlantis", "address": "Lost City 1" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn coordinates_proxy_requires_address() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(Method::GET, "/api/v1/geocoding/coordinates", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn coordinates_proxy_forwards_upstream_body() {
    let server = MockServer::start().await;
    mock_geocoder(&server, ResponseTemplate::new(200).set_body_json(ok_body(40.0, -3.0))).await;

    let app = TestApp::with_geocoder(format!("{}/geocode", server.uri())).await;

    let response = app
        .request_authenticated(
            Method::GET,
            "/api/v1/geocoding/coordinates?address=Calle%20Mayor%201",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "OK");
    assert!((body["results"][0]["geometry"]["location"]["lat"].as_f64().expect("lat") - 40.0).abs()
        < 1e-9);
}
