use axum::extract::State;
use service_core::error::AppError;

use crate::AppState;

/// Liveness plus a round-trip to the refresh token store.
pub async fn health_check(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state
        .session
        .health_check()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Refresh token store health check failed");
            AppError::ServiceUnavailable
        })?;

    Ok("OK")
}
