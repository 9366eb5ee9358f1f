pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::SessionConfig;
use crate::services::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub config: SessionConfig,
    pub session: SessionService,
}

pub fn build_router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/api/me", get(handlers::me))
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    let internal = Router::new()
        .route(
            "/api/internal/users/:user_id/revoke-sessions",
            post(handlers::revoke_user_sessions),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::service_auth_middleware,
        ));

    let timeout = Duration::from_secs(state.config.security.request_timeout_seconds);

    Router::new()
        .route("/api/healthz", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/api/login", post(handlers::login))
        .route("/api/refresh", post(handlers::refresh))
        .route("/api/revoke", post(handlers::revoke))
        .merge(authenticated)
        .merge(internal)
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(from_fn(middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");

            tracing::info_span!(
                "http_request",
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
                user_id = tracing::field::Empty,
            )
        }))
        .layer(from_fn(request_id_middleware))
}
