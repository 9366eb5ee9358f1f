use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::AppState;

/// Identity resolved from a verified access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Require a valid bearer access token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = state.session.authorize(req.headers())?;

    tracing::Span::current().record("user_id", tracing::field::display(user_id));
    req.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(req).await)
}

/// Require `Authorization: ApiKey <key>` matching the configured service key.
pub async fn service_auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    state.session.authorize_service(req.headers())?;
    Ok(next.run(req).await)
}

/// Extractor for handlers behind `auth_middleware`.
pub struct AuthUser(pub AuthenticatedUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| {
                AppError::InternalError(anyhow::anyhow!(
                    "Authenticated user missing from request extensions"
                ))
            })?;

        Ok(AuthUser(user))
    }
}
