mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{body_json, TestApp};

#[tokio::test]
async fn signup_login_verify_round_trip() {
    let app = TestApp::new().await;

    let signup = app
        .request(
            Method::POST,
            "/auth/signup",
            Some(json!({
                "email": "maria@example.com",
                "password": "s3cret",
                "username": "maria",
            })),
        )
        .await;
    assert_eq!(signup.status(), StatusCode::CREATED);

    let created = body_json(signup).await;
    assert_eq!(created["email"], "maria@example.com");
    assert_eq!(created["role"], "USER");
    // The hash must never leave the server.
    assert!(created.get("password_hash").is_none());

    let login = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({
                "email": "maria@example.com",
                "password": "s3cret",
            })),
        )
        .await;
    assert_eq!(login.status(), StatusCode::OK);

    let tokens = body_json(login).await;
    let auth_token = tokens["authToken"].as_str().expect("authToken").to_string();
    assert_eq!(tokens["userId"], created["id"]);

    let verify = app
        .request_with_token(Method::GET, "/auth/verify", None, &auth_token)
        .await;
    assert_eq!(verify.status(), StatusCode::OK);
    let verified = body_json(verify).await;
    assert_eq!(verified["loggedUserData"]["role"], "USER");
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let app = TestApp::new().await;

    let payload = json!({
        "email": "pepe@example.com",
        "password": "s3cret",
        "username": "pepe",
    });

    let first = app
        .request(Method::POST, "/auth/signup", Some(payload.clone()))
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.request(Method::POST, "/auth/signup", Some(payload)).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = body_json(second).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn signup_rejects_invalid_email_and_short_password() {
    let app = TestApp::new().await;

    let bad_email = app
        .request(
            Method::POST,
            "/auth/signup",
            Some(json!({
                "email": "not-an-email",
                "password": "s3cret",
                "username": "luis",
            })),
        )
        .await;
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);

    let short_password = app
        .request(
            Method::POST,
            "/auth/signup",
            Some(json!({
                "email": "luis@example.com",
                "password": "ab",
                "username": "luis",
            })),
        )
        .await;
    assert_eq!(short_password.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = TestApp::new().await;

    app.request(
        Method::POST,
        "/auth/signup",
        Some(json!({
            "email": "ana@example.com",
            "password": "correct1",
            "username": "ana",
        })),
    )
    .await;

    let login = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({
                "email": "ana@example.com",
                "password": "wrong",
            })),
        )
        .await;
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_unknown_user_is_unauthorized() {
    let app = TestApp::new().await;

    let login = app
        .request(
            Method::POST,
            "/auth/login",
            Some(json!({
                "email": "nobody@example.com",
                "password": "whatever",
            })),
        )
        .await;
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_without_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/auth/verify", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
