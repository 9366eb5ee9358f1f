//! Shared setup for session-service integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use secrecy::Secret;
use session_service::{
    build_router,
    config::{DatabaseConfig, Environment, JwtConfig, SecurityConfig, SessionConfig},
    models::User,
    services::{
        metrics, InMemoryIdentityStore, InMemoryRefreshTokenStore, JwtService, RefreshTokenStore,
        SessionService,
    },
    utils::{hash_password, Password},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-signing-secret";
pub const TEST_SERVICE_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const TEST_EMAIL: &str = "a@b.com";
pub const TEST_PASSWORD: &str = "secret1";

pub fn test_config() -> SessionConfig {
    SessionConfig {
        common: service_core::config::Config::default(),
        environment: Environment::Dev,
        service_name: "session-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: "postgres://localhost/sessions_test".to_string(),
            max_connections: 5,
            min_connections: 1,
            query_timeout_seconds: 5,
        },
        jwt: JwtConfig {
            secret: Secret::new(TEST_SECRET.to_string()),
            access_token_expiry_minutes: 60,
            refresh_token_expiry_days: 60,
        },
        security: SecurityConfig {
            service_api_key: Some(Secret::new(TEST_SERVICE_KEY.to_string())),
            request_timeout_seconds: 10,
        },
    }
}

/// Router over in-memory stores with one seeded identity.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub refresh_tokens: Arc<InMemoryRefreshTokenStore>,
    pub user: User,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_refresh_store(InMemoryRefreshTokenStore::new())
    }

    pub fn with_refresh_store(store: InMemoryRefreshTokenStore) -> Self {
        let refresh_tokens = Arc::new(store);
        let (state, user) = app_state(refresh_tokens.clone(), Duration::from_secs(5));

        Self {
            router: build_router(state.clone()),
            state,
            refresh_tokens,
            user,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    pub async fn login(&self) -> serde_json::Value {
        let response = self.send(login_request(TEST_EMAIL, TEST_PASSWORD)).await;
        assert_eq!(response.status(), 200);
        json_body(response).await
    }
}

/// App state over any refresh token store, with the test identity seeded.
pub fn app_state(
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    storage_timeout: Duration,
) -> (AppState, User) {
    let _ = metrics::init_metrics();

    let config = test_config();

    let hash = hash_password(&Password::new(TEST_PASSWORD.to_string()))
        .expect("Failed to hash test password");
    let user = User::new(TEST_EMAIL.to_string(), hash.into_string());

    let identities = InMemoryIdentityStore::new();
    identities
        .insert(user.clone())
        .expect("Failed to seed identity");

    let session = SessionService::new(
        Arc::new(identities),
        refresh_tokens,
        JwtService::new(&config.jwt).expect("Invalid test JWT config"),
        config.security.service_api_key.clone(),
    )
    .with_storage_timeout(storage_timeout);

    (AppState { config, session }, user)
}

pub fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "email": email, "password": password }).to_string(),
        ))
        .expect("Failed to build login request")
}

pub fn with_authorization(method: &str, uri: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .expect("Failed to build request")
}

pub fn bearer(method: &str, uri: &str, token: &str) -> Request<Body> {
    with_authorization(method, uri, &format!("Bearer {}", token))
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

pub async fn text_body(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
