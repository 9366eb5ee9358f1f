use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{RefreshToken, REFRESH_TOKEN_EXPIRY_DAYS};
use crate::services::{AuthError, Database};

/// Durable store of opaque refresh tokens.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Mint and persist a fresh token bound to `user_id`.
    async fn issue(&self, user_id: Uuid) -> Result<String, AuthError>;

    /// Resolve a token to its identity: `NotFound`, `Revoked` or `Expired`
    /// otherwise.
    async fn validate(&self, token: &str) -> Result<Uuid, AuthError>;

    /// Revoke a token. Unknown and already-revoked tokens are a no-op.
    async fn revoke(&self, token: &str) -> Result<(), AuthError>;

    /// Revoke every live token of an identity, returning how many changed.
    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AuthError>;

    async fn health_check(&self) -> Result<(), AuthError>;
}

/// PostgreSQL-backed store over the `refresh_tokens` table.
#[derive(Clone)]
pub struct PgRefreshTokenStore {
    db: Database,
    lifetime: Duration,
}

impl PgRefreshTokenStore {
    pub fn new(db: Database, lifetime: Duration) -> Self {
        Self { db, lifetime }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        let token = RefreshToken::new(user_id, self.lifetime)?;
        self.db.insert_refresh_token(&token).await?;

        tracing::debug!(user_id = %user_id, expires_at = %token.expires_at, "Refresh token issued");
        Ok(token.token)
    }

    async fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        self.db
            .find_refresh_token(token)
            .await?
            .ok_or(AuthError::NotFound)?
            .bound_user()
    }

    async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let revoked = self.db.revoke_refresh_token(token).await?;
        tracing::debug!(revoked, "Refresh token revoke processed");
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let revoked = self.db.revoke_all_user_refresh_tokens(user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "Revoked all refresh tokens for user");
        Ok(revoked)
    }

    async fn health_check(&self) -> Result<(), AuthError> {
        self.db
            .health_check()
            .await
            .map_err(|e| AuthError::Storage(anyhow::anyhow!(e.to_string())))
    }
}

/// In-process store with the same semantics, for tests and local runs.
pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<HashMap<String, RefreshToken>>,
    lifetime: Duration,
}

impl Default for InMemoryRefreshTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::with_lifetime(Duration::days(REFRESH_TOKEN_EXPIRY_DAYS))
    }

    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            lifetime,
        }
    }

    /// Snapshot of a stored row.
    pub fn get(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
        Ok(self.lock()?.get(token).cloned())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, RefreshToken>>, AuthError> {
        self.tokens
            .lock()
            .map_err(|e| AuthError::Storage(anyhow::anyhow!("Refresh token store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        let token = RefreshToken::new(user_id, self.lifetime)?;
        let mut tokens = self.lock()?;
        if tokens.contains_key(&token.token) {
            return Err(AuthError::Storage(anyhow::anyhow!(
                "duplicate refresh token primary key"
            )));
        }
        let value = token.token.clone();
        tokens.insert(value.clone(), token);
        Ok(value)
    }

    async fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        self.lock()?
            .get(token)
            .ok_or(AuthError::NotFound)?
            .bound_user()
    }

    async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        if let Some(row) = self.lock()?.get_mut(token) {
            if row.revoked_at.is_none() {
                let now = Utc::now();
                row.revoked_at = Some(now);
                row.updated_at = now;
            }
        }
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let now = Utc::now();
        let mut revoked = 0;
        for row in self.lock()?.values_mut() {
            if row.user_id == user_id && row.revoked_at.is_none() {
                row.revoked_at = Some(now);
                row.updated_at = now;
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn health_check(&self) -> Result<(), AuthError> {
        self.lock().map(|_| ())
    }
}
