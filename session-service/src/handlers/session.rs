use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{LoginRequest, LoginResponse, MeResponse, RefreshResponse, RevokeSessionsResponse},
    middleware::AuthUser,
    utils::{Password, ValidatedJson},
    AppState,
};

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let password = Password::new(req.password);
    let session = state.session.login(&req.email, &password).await?;
    Ok(Json(session.into()))
}

/// `POST /api/refresh` with the refresh token as bearer.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, AppError> {
    let token = state.session.refresh(&headers).await?;
    Ok(Json(RefreshResponse { token }))
}

/// `POST /api/revoke` with the refresh token as bearer.
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    state.session.revoke(&headers).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/me`
pub async fn me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse { id: user.user_id })
}

/// `POST /api/internal/users/:user_id/revoke-sessions`, service callers only.
pub async fn revoke_user_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<RevokeSessionsResponse>, AppError> {
    let revoked = state.session.revoke_all_for_user(user_id).await?;
    Ok(Json(RevokeSessionsResponse { revoked }))
}
