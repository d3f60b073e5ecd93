mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use solentine_api::auth::SignupRequest;
use solentine_api::entities::user::UserRole;

use common::{body_json, TestApp};

async fn plain_user_token(app: &TestApp, email: &str, username: &str) -> String {
    let user = app
        .auth_service
        .signup(SignupRequest {
            email: email.to_string(),
            password: "secret123".to_string(),
            username: username.to_string(),
            avatar: None,
            first_name: None,
            family_name: None,
            role: Some(UserRole::User),
        })
        .await
        .expect("signup plain user");
    app.auth_service
        .generate_token(&user)
        .expect("token for plain user")
}

#[tokio::test]
async fn listing_users_returns_seeded_accounts() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(Method::GET, "/api/v1/users", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let users = body.as_array().expect("user list");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "tester@example.com");
}

#[tokio::test]
async fn user_deletion_is_admin_gated() {
    let app = TestApp::new().await;
    let plain_token = plain_user_token(&app, "worker@example.com", "worker").await;

    // Find the plain user's id via the listing
    let listing = app
        .request_authenticated(Method::GET, "/api/v1/users?limit=10", None)
        .await;
    let body = body_json(listing).await;
    let plain_id = body
        .as_array()
        .expect("user list")
        .iter()
        .find(|u| u["email"] == "worker@example.com")
        .and_then(|u| u["id"].as_str())
        .expect("plain user id")
        .to_string();

    // A non-admin may not delete accounts
    let forbidden = app
        .request_with_token(
            Method::DELETE,
            &format!("/api/v1/users/{plain_id}"),
            None,
            &plain_token,
        )
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    // The seeded admin may
    let deleted = app
        .request_authenticated(Method::DELETE, &format!("/api/v1/users/{plain_id}"), None)
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let gone = app
        .request_authenticated(Method::GET, &format!("/api/v1/users/{plain_id}"), None)
        .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_user_changes_profile_fields() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/users/{}", app.user_id),
            Some(json!({ "username": "renamed", "avatar": "https://example.com/a.png" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["username"], "renamed");
    assert_eq!(body["avatar"], "https://example.com/a.png");
    assert!(body.get("password_hash").is_none());
}
