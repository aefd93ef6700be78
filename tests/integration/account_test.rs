//! Admin self-registration, email verification, and password reset.

use axum::http::StatusCode;
use serde_json::json;

use herp_database::PrincipalStore;

use crate::helpers::{STRONG, TestApp};

const NEW_PASSWORD: &str = "Cedar-Atrium-Lamp-41";

#[tokio::test]
async fn test_register_then_verify_email() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({
                "username": "nightmanager",
                "email": "night@hotel.com",
                "password": STRONG,
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    assert_eq!(response.body["data"]["email_verified"], json!(false));
    assert!(response.body["data"].get("verification_code").is_none());

    let mail = app.outbox.last_to("night@hotel.com").expect("verification mail");
    let code = app
        .store
        .find_admin_by_email("night@hotel.com")
        .await
        .unwrap()
        .unwrap()
        .verification_code
        .unwrap();
    assert!(mail.body.contains(&code));

    let wrong = app
        .request(
            "POST",
            "/api/v1/auth/verify-email",
            Some(json!({ "email": "night@hotel.com", "code": "0000000" })),
            None,
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            "/api/v1/auth/verify-email",
            Some(json!({ "email": "night@hotel.com", "code": code })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let admin = app
        .store
        .find_admin_by_email("night@hotel.com")
        .await
        .unwrap()
        .unwrap();
    assert!(admin.email_verified);
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({
                "username": "someoneelse",
                "email": "admin@hotel.com",
                "password": STRONG,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_malformed_body() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({ "username": "ab", "email": "not-an-email", "password": "short" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
    assert!(app.outbox.sent().is_empty());
}

#[tokio::test]
async fn test_forgot_password_answers_the_same_for_unknown_email() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;

    let known = app
        .request(
            "POST",
            "/api/v1/auth/forgot-password",
            Some(json!({ "email": "admin@hotel.com" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/api/v1/auth/forgot-password",
            Some(json!({ "email": "ghost@hotel.com" })),
            None,
        )
        .await;

    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(known.body, unknown.body);
    assert_eq!(app.outbox.sent().len(), 1);
}

#[tokio::test]
async fn test_reset_password_replaces_password_and_ends_sessions() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;
    let session = app.login("admin@hotel.com", STRONG).await;

    app.request(
        "POST",
        "/api/v1/auth/forgot-password",
        Some(json!({ "email": "admin@hotel.com" })),
        None,
    )
    .await;
    let code = app
        .store
        .find_admin_by_email("admin@hotel.com")
        .await
        .unwrap()
        .unwrap()
        .reset_code
        .unwrap();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/reset-password",
            Some(json!({
                "email": "admin@hotel.com",
                "code": code,
                "new_password": NEW_PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);

    let refresh = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": session["refresh_token"] })),
            None,
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);

    let old = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "admin@hotel.com", "password": STRONG })),
            None,
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    app.login("admin@hotel.com", NEW_PASSWORD).await;

    let reuse = app
        .request(
            "POST",
            "/api/v1/auth/reset-password",
            Some(json!({
                "email": "admin@hotel.com",
                "code": code,
                "new_password": STRONG,
            })),
            None,
        )
        .await;
    assert_eq!(reuse.status, StatusCode::BAD_REQUEST);
}
