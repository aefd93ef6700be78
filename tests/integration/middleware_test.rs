//! Per-IP request limit and the health check.

use std::time::Duration;

use axum::http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health_without_database() {
    let app = TestApp::new();

    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], "not_configured");
    assert_eq!(response.body["cache"], "up");
}

#[tokio::test]
async fn test_rate_limit_headers_count_down() {
    let app = TestApp::with_request_limit(3);

    for expected_remaining in ["2", "1", "0"] {
        let response = app.request("GET", "/health", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header("x-ratelimit-limit"), Some("3"));
        assert_eq!(response.header("x-ratelimit-remaining"), Some(expected_remaining));
        assert_eq!(response.header("x-ratelimit-reset"), Some("60"));
    }
}

#[tokio::test]
async fn test_rate_limit_rejects_then_recovers() {
    let app = TestApp::with_request_limit(3);
    for _ in 0..3 {
        app.request("GET", "/health", None, None).await;
    }

    let response = app.request("GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.body["error"], "RATE_LIMITED");
    assert_eq!(response.header("x-ratelimit-remaining"), Some("0"));
    assert!(response.header("retry-after").is_some());

    app.clock.advance(Duration::from_secs(61));

    let response = app.request("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_forwarded_for_keys_on_proxy_appended_address() {
    let app = TestApp::behind_proxy(2);

    for spoofed in ["1.1.1.1", "2.2.2.2"] {
        let response = app
            .get_forwarded("/health", &format!("{spoofed}, 198.51.100.7"))
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = app
        .get_forwarded("/health", "3.3.3.3, 198.51.100.7")
        .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    let response = app.get_forwarded("/health", "1.1.1.1, 198.51.100.8").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-ratelimit-remaining"), Some("1"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/v1/nowhere", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
