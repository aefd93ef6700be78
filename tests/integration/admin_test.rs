//! Admin routes behind `admin:manage`.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{STRONG, TestApp};

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/v1/admin/users", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_forbidden_from_admin_routes() {
    let app = TestApp::new();
    app.create_staff("frontdesk", "desk@hotel.com").await;
    let token = app.access_token("desk@hotel.com").await;

    for uri in [
        "/api/v1/admin/users",
        "/api/v1/admin/roles",
        "/api/v1/admin/permissions",
        "/api/v1/admin/login-history",
    ] {
        let response = app.request("GET", uri, None, Some(&token)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(response.body["error"], "FORBIDDEN");
    }
}

#[tokio::test]
async fn test_admin_creates_and_lists_users() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;
    let token = app.access_token("admin@hotel.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/admin/users",
            Some(json!({
                "username": "barista",
                "email": "barista@hotel.com",
                "password": STRONG,
                "role_id": 2,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let created = &response.body["data"];
    assert_eq!(created["username"], "barista");
    assert_eq!(created["is_active"], json!(true));
    assert!(created.get("password_hash").is_none());
    let id = created["id"].as_i64().unwrap();

    let response = app
        .request("GET", "/api/v1/admin/users", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["total_items"], json!(1));

    let response = app
        .request("GET", &format!("/api/v1/admin/users/{id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["role_name"], "pos_staff");

    let login = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "username": "barista", "password": STRONG })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;
    app.create_staff("frontdesk", "desk@hotel.com").await;
    let token = app.access_token("admin@hotel.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/admin/users",
            Some(json!({
                "username": "frontdesk",
                "password": STRONG,
                "role_id": 2,
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;
    let token = app.access_token("admin@hotel.com").await;

    let response = app
        .request("GET", "/api/v1/admin/users/9999", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_revoke_user_sessions() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;
    let staff = app.create_staff("frontdesk", "desk@hotel.com").await;
    let token = app.access_token("admin@hotel.com").await;
    let staff_login = app.login("desk@hotel.com", STRONG).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/admin/users/{}/sessions", staff.id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revoked"], json!(1));

    let refresh = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": staff_login["refresh_token"] })),
            None,
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_history_records_attempts() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;
    let token = app.access_token("admin@hotel.com").await;
    app.request(
        "POST",
        "/api/v1/auth/login",
        Some(json!({ "email": "admin@hotel.com", "password": "wrong-password" })),
        None,
    )
    .await;

    let response = app
        .request("GET", "/api/v1/admin/login-history", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["total_items"], json!(2));
}

#[tokio::test]
async fn test_role_permission_grants() {
    let app = TestApp::new();
    app.create_admin("hoteladmin", "admin@hotel.com").await;
    let token = app.access_token("admin@hotel.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/admin/roles",
            Some(json!({ "name": "housekeeping", "description": "Room staff" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    let role_id = response.body["data"]["id"].as_i64().unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/v1/admin/roles/{role_id}/permissions/2"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request(
            "GET",
            &format!("/api/v1/admin/roles/{role_id}/permissions"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let codes: Vec<&str> = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["code"].as_str())
        .collect();
    assert_eq!(codes, vec!["pos:view"]);

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/admin/roles/{role_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
}
