use service_core::error::AppError;
use service_core::observability::init_tracing;
use session_service::{
    build_router,
    config::SessionConfig,
    db,
    services::{metrics, Database, JwtService, PgRefreshTokenStore, SessionService},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = SessionConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )
    .map_err(AppError::ConfigError)?;

    metrics::init_metrics()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to register metrics: {}", e)))?;

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting session service"
    );

    let pool = db::create_pool(&config.database)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
    let database = Database::new(pool);

    let jwt = JwtService::new(&config.jwt).map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
    let refresh_lifetime = chrono::Duration::try_days(config.jwt.refresh_token_expiry_days)
        .ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("REFRESH_TOKEN_EXPIRY_DAYS out of range"))
        })?;
    let refresh_tokens = Arc::new(PgRefreshTokenStore::new(database.clone(), refresh_lifetime));
    let session = SessionService::new(
        Arc::new(database),
        refresh_tokens,
        jwt,
        config.security.service_api_key.clone(),
    )
    .with_storage_timeout(Duration::from_secs(config.database.query_timeout_seconds));

    if config.security.service_api_key.is_none() {
        tracing::warn!("SERVICE_API_KEY not set; internal routes will reject every caller");
    }

    let addr = config.common.socket_addr();
    let state = AppState {
        config: config.clone(),
        session,
    };
    let app = build_router(state);

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
