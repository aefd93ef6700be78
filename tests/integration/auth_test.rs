//! Login, refresh, logout, and me over HTTP.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{STRONG, TestApp};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    let admin = app.create_admin("hoteladmin", "admin@hotel.com").await;

    let data = app.login("admin@hotel.com", STRONG).await;

    assert!(data["access_token"].as_str().is_some());
    assert!(data["refresh_token"].as_str().is_some());
    assert_eq!(data["expires_in"], json!(15 * 60));
    assert_eq!(data["principal"]["kind"], "admin");
    assert_eq!(data["principal"]["id"], json!(admin.id));
    assert!(data["principal"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_by_username() {
    let app = TestApp::new();
    app.create_staff("frontdesk", "desk@hotel.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "username": "frontdesk", "password": STRONG })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["principal"]["kind"], "user");
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "admin@hotel.com", "password": "wrong-password" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "INVALID_CREDENTIALS");
    assert_eq!(response.body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_unknown_user_looks_like_wrong_password() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "nobody@hotel.com", "password": "whatever1" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_requires_identifier() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "password": "whatever1" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_sixth_attempt_is_rate_limited() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;

    for _ in 0..5 {
        let response = app
            .request(
                "POST",
                "/api/v1/auth/login",
                Some(json!({ "email": "admin@hotel.com", "password": "wrong-password" })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "admin@hotel.com", "password": STRONG })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.body["error"], "RATE_LIMITED");
    let retry_after: u64 = response
        .header("retry-after")
        .expect("Retry-After header")
        .parse()
        .unwrap();
    assert!(retry_after > 0);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/v1/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_returns_claims() {
    let app = TestApp::new();
    let staff = app.create_staff("frontdesk", "desk@hotel.com").await;
    let token = app.access_token("desk@hotel.com").await;

    let response = app.request("GET", "/api/v1/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["user_id"], json!(staff.id));
    assert_eq!(data["username"], "frontdesk");
    assert_eq!(data["role"], "pos_staff");
    let permissions: Vec<&str> = data["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p.as_str())
        .collect();
    assert!(permissions.contains(&"pos:sell"));
    assert!(!permissions.contains(&"admin:manage"));
}

#[tokio::test]
async fn test_me_rejects_garbage_token() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/v1/auth/me", None, Some("not-a-jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_logout_blacklists_token() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;
    let token = app.access_token("admin@hotel.com").await;

    let response = app
        .request("POST", "/api/v1/auth/logout", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/api/v1/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "TOKEN_BLACKLISTED");
}

#[tokio::test]
async fn test_logout_without_header() {
    let app = TestApp::new();

    let response = app.request("POST", "/api/v1/auth/logout", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rotates_token() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;
    let data = app.login("admin@hotel.com", STRONG).await;
    let original = data["refresh_token"].as_str().unwrap().to_string();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": original })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let rotated = response.body["data"]["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(rotated, original);

    let replay = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": original })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);

    let again = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": rotated })),
            None,
        )
        .await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_all_revokes_refresh_tokens() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;
    let first = app.login("admin@hotel.com", STRONG).await;
    let second = app.login("admin@hotel.com", STRONG).await;
    let token = second["access_token"].as_str().unwrap().to_string();

    let response = app
        .request("POST", "/api/v1/auth/logout-all", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revoked"], json!(2));

    let replay = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": first["refresh_token"] })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
}
