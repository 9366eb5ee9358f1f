use service_core::error::AppError;
use thiserror::Error;

use crate::services::metrics;

/// Failure kinds of the credential and session core.
///
/// Every credential failure keeps its precise kind here; the `AppError`
/// conversion below collapses them into one opaque 401.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing credential")]
    MissingCredential,

    #[error("Malformed credential: {0}")]
    MalformedCredential(&'static str),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token subject is not a user id")]
    MalformedSubject,

    #[error("Token revoked")]
    Revoked,

    #[error("Token not found")]
    NotFound,

    #[error("Password does not match")]
    PasswordMismatch,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(anyhow::Error),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Internal error: {0}")]
    Internal(anyhow::Error),
}

impl AuthError {
    /// Stable label used in logs and the `auth_failures_total` counter.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedCredential(_) => "malformed_credential",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "expired",
            AuthError::MalformedSubject => "malformed_subject",
            AuthError::Revoked => "revoked",
            AuthError::NotFound => "not_found",
            AuthError::PasswordMismatch => "password_mismatch",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Storage(_) => "storage",
            AuthError::Hash(_) => "hash",
            AuthError::Internal(_) => "internal",
        }
    }

    /// True for everything the caller must only ever see as "unauthorized".
    pub fn is_credential_failure(&self) -> bool {
        !matches!(
            self,
            AuthError::Storage(_) | AuthError::Hash(_) | AuthError::Internal(_)
        )
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Storage(anyhow::Error::new(err))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let kind = err.kind();
        if err.is_credential_failure() {
            metrics::record_auth_failure(kind);
            tracing::warn!(kind, reason = %err, "Credential rejected");
            return AppError::Unauthorized(anyhow::anyhow!("Unauthorized"));
        }

        match err {
            AuthError::Storage(e) => AppError::DatabaseError(e),
            AuthError::Hash(msg) => {
                AppError::InternalError(anyhow::anyhow!("Password hashing failed: {}", msg))
            }
            AuthError::Internal(e) => AppError::InternalError(e),
            _ => AppError::InternalError(anyhow::anyhow!("Unexpected auth error kind: {}", kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    async fn body_of(err: AuthError) -> (StatusCode, serde_json::Value) {
        let res = AppError::from(err).into_response();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn credential_failures_share_one_response_shape() {
        let failures = vec![
            AuthError::MissingCredential,
            AuthError::MalformedCredential("expected Bearer scheme"),
            AuthError::InvalidSignature,
            AuthError::Expired,
            AuthError::MalformedSubject,
            AuthError::Revoked,
            AuthError::NotFound,
            AuthError::PasswordMismatch,
            AuthError::InvalidCredentials,
        ];

        let mut bodies = Vec::new();
        for failure in failures {
            assert!(failure.is_credential_failure());
            let (status, body) = body_of(failure).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            bodies.push(body);
        }

        assert!(bodies.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(bodies[0]["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn infrastructure_failures_are_generic_server_errors() {
        let (status, body) =
            body_of(AuthError::Storage(anyhow::anyhow!("connection reset by peer"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("connection reset"));

        let (status, _) = body_of(AuthError::Hash("rng failure".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn only_credential_failures_are_counted() {
        let metrics = metrics::init_metrics().unwrap();
        let storage = metrics.auth_failures_total.with_label_values(&["storage"]);
        let hash = metrics.auth_failures_total.with_label_values(&["hash"]);
        let expired = metrics.auth_failures_total.with_label_values(&["expired"]);
        let expired_before = expired.get();

        let _ = AppError::from(AuthError::Storage(anyhow::anyhow!("timed out")));
        let _ = AppError::from(AuthError::Hash("rng failure".to_string()));
        let _ = AppError::from(AuthError::Expired);

        assert_eq!(storage.get(), 0);
        assert_eq!(hash.get(), 0);
        assert!(expired.get() > expired_before);
    }

    #[test]
    fn sqlx_errors_are_storage_errors() {
        let err = AuthError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), "storage");
        assert!(!err.is_credential_failure());
    }
}
