//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use herp_api::{AppState, build_router};
use herp_auth::AuthStores;
use herp_auth::mailer::OutboxMailer;
use herp_cache::CacheManager;
use herp_cache::memory::MemoryCacheProvider;
use herp_core::config::AppConfig;
use herp_core::traits::ManualClock;
use herp_database::{MemoryStore, PrincipalStore};
use herp_entity::principal::{Admin, CreateAdmin, CreateUser, User};

/// A password the strength checker accepts.
pub const STRONG: &str = "Saffron-Lobby-Key-93";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct setup and inspection
    pub store: Arc<MemoryStore>,
    /// Captured outgoing mail
    pub outbox: OutboxMailer,
    /// Clock shared by the service and the cache
    pub clock: Arc<ManualClock>,
    /// Application state, for hashing fixtures
    pub state: AppState,
}

/// Response from a test request
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

fn test_config(requests_per_minute: u32, trust_forwarded_for: bool) -> AppConfig {
    let raw = format!(
        r#"
        [server]
        trust_forwarded_for = {trust_forwarded_for}

        [database]
        url = "postgres://unused/herp"

        [auth]
        jwt_secret = "integration-access-secret"
        jwt_refresh_secret = "integration-refresh-secret"
        bcrypt_cost = 4

        [rate_limit]
        requests_per_minute = {requests_per_minute}

        [worker]
        enabled = false
        "#
    );
    config::Config::builder()
        .add_source(config::File::from_str(&raw, config::FileFormat::Toml))
        .build()
        .expect("Failed to build test config")
        .try_deserialize()
        .expect("Failed to deserialize test config")
}

impl TestApp {
    /// Create a new test application with a generous per-IP budget.
    pub fn new() -> Self {
        Self::with_request_limit(10_000)
    }

    /// Create a test application with a specific per-IP requests-per-minute budget.
    pub fn with_request_limit(requests_per_minute: u32) -> Self {
        Self::build(test_config(requests_per_minute, false))
    }

    /// Like [`TestApp::with_request_limit`], but trusting `X-Forwarded-For`.
    pub fn behind_proxy(requests_per_minute: u32) -> Self {
        Self::build(test_config(requests_per_minute, true))
    }

    fn build(config: AppConfig) -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let store = Arc::new(MemoryStore::seeded());
        let outbox = OutboxMailer::new();

        let provider = MemoryCacheProvider::new(&config.cache.memory, clock.clone());
        let cache = Arc::new(CacheManager::from_provider(Arc::new(provider)));

        let state = AppState::new(
            config,
            AuthStores::shared(store.clone()),
            cache,
            Arc::new(outbox.clone()),
            clock.clone(),
            None,
        )
        .expect("Failed to build app state");

        Self {
            router: build_router(state.clone()),
            store,
            outbox,
            clock,
            state,
        }
    }

    /// Insert a verified admin holding the `admin` role.
    pub async fn create_admin(&self, username: &str, email: &str) -> Admin {
        let password_hash = self
            .state
            .auth
            .hash_password(STRONG)
            .await
            .expect("Failed to hash password");
        self.store
            .create_admin(CreateAdmin {
                username: username.into(),
                email: email.into(),
                password_hash,
                first_name: None,
                last_name: None,
                role_id: 1,
            })
            .await
            .expect("Failed to create admin")
    }

    /// Insert an active `pos_staff` user.
    pub async fn create_staff(&self, username: &str, email: &str) -> User {
        let password_hash = self
            .state
            .auth
            .hash_password(STRONG)
            .await
            .expect("Failed to hash password");
        self.store
            .create_user(CreateUser {
                username: username.into(),
                email: Some(email.into()),
                password_hash,
                first_name: None,
                last_name: None,
                role_id: 2,
                is_active: true,
            })
            .await
            .expect("Failed to create user")
    }

    /// Log in and return the `data` object of the response.
    pub async fn login(&self, identifier: &str, password: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/api/v1/auth/login",
                Some(serde_json::json!({ "email": identifier, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["data"].clone()
    }

    /// Log in and return only the access token.
    pub async fn access_token(&self, identifier: &str) -> String {
        let data = self.login(identifier, STRONG).await;
        data["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let request = if let Some(body) = body {
            builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
                .expect("build request")
        } else {
            builder.body(Body::empty()).expect("build request")
        };

        self.send(request).await
    }

    /// GET `uri` carrying the given `X-Forwarded-For` value.
    pub async fn get_forwarded(&self, uri: &str, forwarded_for: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header("X-Forwarded-For", forwarded_for)
            .body(Body::empty())
            .expect("build request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl TestResponse {
    /// Header value as a string, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
