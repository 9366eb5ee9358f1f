use axum::http::HeaderMap;
use secrecy::{ExposeSecret, Secret};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    models::UserResponse,
    services::{
        credentials::{extract_api_key, extract_bearer},
        AuthError, IdentityStore, JwtService, RefreshTokenStore,
    },
    utils::{burn_verification, verify_password, Password, PasswordHashString},
};

/// Default bound on a single identity or refresh token store call.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tokens handed out by a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

/// Where a client's pair of tokens puts it in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Uuid),
    AccessExpired(Uuid),
    Revoked,
    Expired,
}

/// Login, refresh, revoke and request authorization over the token stores.
#[derive(Clone)]
pub struct SessionService {
    identities: Arc<dyn IdentityStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    jwt: JwtService,
    service_api_key: Option<Secret<String>>,
    storage_timeout: Duration,
}

impl SessionService {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        jwt: JwtService,
        service_api_key: Option<Secret<String>>,
    ) -> Self {
        Self {
            identities,
            refresh_tokens,
            jwt,
            service_api_key,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    /// Bound every store call; a call that outlives it fails as `Storage`.
    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, AuthError>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.storage_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_ms = self.storage_timeout.as_millis() as u64,
                    "Storage call timed out"
                );
                Err(AuthError::Storage(anyhow::anyhow!(
                    "{} timed out after {:?}",
                    operation,
                    self.storage_timeout
                )))
            }
        }
    }

    /// Verify email and password, then mint an access and a refresh token.
    ///
    /// Unknown email and wrong password both end in `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &Password) -> Result<Session, AuthError> {
        let user = match self
            .bounded("find_by_email", self.identities.find_by_email(email))
            .await?
        {
            Some(user) => user,
            None => {
                burn_verification(password);
                tracing::debug!("Login for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let hash = PasswordHashString::new(user.hashed_password.clone());
        match verify_password(password, &hash) {
            Ok(()) => {}
            Err(AuthError::PasswordMismatch) => {
                tracing::debug!(user_id = %user.id, "Login password mismatch");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                return Err(AuthError::InvalidCredentials);
            }
        }

        let access_token = self.jwt.issue(user.id)?;
        let refresh_token = self
            .bounded("issue_refresh_token", self.refresh_tokens.issue(user.id))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(Session {
            user: user.sanitized(),
            access_token,
            refresh_token,
        })
    }

    /// Exchange the bearer refresh token for a new access token. The refresh
    /// token itself is left as is.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        let token = extract_bearer(headers)?;
        let user_id = self
            .bounded("validate_refresh_token", self.refresh_tokens.validate(&token))
            .await?;
        let access_token = self.jwt.issue(user_id)?;

        tracing::debug!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke the bearer refresh token. Succeeds whether or not it exists.
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let token = extract_bearer(headers)?;
        self.bounded("revoke_refresh_token", self.refresh_tokens.revoke(&token))
            .await
    }

    /// Revoke every live refresh token of `user_id`, returning how many changed.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, AuthError> {
        self.bounded(
            "revoke_all_refresh_tokens",
            self.refresh_tokens.revoke_all_for_user(user_id),
        )
        .await
    }

    pub async fn health_check(&self) -> Result<(), AuthError> {
        self.bounded("health_check", self.refresh_tokens.health_check())
            .await
    }

    /// Identity behind the bearer access token.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let token = extract_bearer(headers)?;
        self.jwt.validate(&token)
    }

    /// Check an `ApiKey` credential against the configured service key.
    pub fn authorize_service(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let presented = extract_api_key(headers)?;

        let Some(expected) = &self.service_api_key else {
            tracing::warn!("Service key presented but none is configured");
            return Err(AuthError::InvalidCredentials);
        };

        let matches: bool = presented
            .as_bytes()
            .ct_eq(expected.expose_secret().as_bytes())
            .into();

        if matches {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Classify a client's tokens. An access token that fails verification
    /// for any reason counts as absent.
    pub async fn session_state(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<SessionState, AuthError> {
        if let Some(token) = access_token {
            if let Ok(user_id) = self.jwt.validate(token) {
                return Ok(SessionState::Authenticated(user_id));
            }
        }

        let Some(token) = refresh_token else {
            return Ok(SessionState::Anonymous);
        };

        match self
            .bounded("validate_refresh_token", self.refresh_tokens.validate(token))
            .await
        {
            Ok(user_id) => Ok(SessionState::AccessExpired(user_id)),
            Err(AuthError::Revoked) => Ok(SessionState::Revoked),
            Err(AuthError::Expired) => Ok(SessionState::Expired),
            Err(AuthError::NotFound) => Ok(SessionState::Anonymous),
            Err(e) => Err(e),
        }
    }
}
