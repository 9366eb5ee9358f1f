mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{app_state, bearer, json_body, login_request, TEST_EMAIL, TEST_PASSWORD};
use session_service::{
    build_router,
    services::{AuthError, InMemoryRefreshTokenStore, RefreshTokenStore},
};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;
use uuid::Uuid;

/// Refresh token store whose validation hangs well past any request timeout.
struct HungStore {
    inner: InMemoryRefreshTokenStore,
}

#[async_trait]
impl RefreshTokenStore for HungStore {
    async fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.inner.issue(user_id).await
    }

    async fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        self.inner.validate(token).await
    }

    async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        self.inner.revoke(token).await
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AuthError> {
        self.inner.revoke_all_for_user(user_id).await
    }

    async fn health_check(&self) -> Result<(), AuthError> {
        self.inner.health_check().await
    }
}

#[tokio::test]
async fn hung_store_answers_generic_server_error() {
    let store = Arc::new(HungStore {
        inner: InMemoryRefreshTokenStore::new(),
    });
    let (state, _) = app_state(store, Duration::from_millis(50));
    let router = build_router(state);

    let login = router
        .clone()
        .oneshot(login_request(TEST_EMAIL, TEST_PASSWORD))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    let refresh = json_body(login).await["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = router
        .oneshot(bearer("POST", "/api/refresh", &refresh))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "error": "Internal server error" })
    );
}
