//! Refresh token model - one row per issued long-lived session credential.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::AuthError;

/// Random bytes behind every refresh token (256 bits).
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Default refresh token lifetime.
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 60;

/// Refresh token entity.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Create a new refresh token row with a freshly generated token value.
    pub fn new(user_id: Uuid, lifetime: Duration) -> Result<Self, AuthError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(lifetime).ok_or_else(|| {
            AuthError::Internal(anyhow::anyhow!("Refresh token lifetime out of range"))
        })?;

        Ok(Self {
            token: generate_token(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        })
    }

    /// Check if token is valid (not expired, not revoked).
    pub fn is_valid(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }

    /// Check if token is expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Check if token is revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Resolve the bound identity, or the reason this token is unusable.
    ///
    /// Revocation is reported ahead of expiry so a revoked token stays
    /// `Revoked` for the rest of its life.
    pub fn bound_user(&self) -> Result<Uuid, AuthError> {
        if self.is_revoked() {
            return Err(AuthError::Revoked);
        }
        if self.is_expired() {
            return Err(AuthError::Expired);
        }
        Ok(self.user_id)
    }
}

/// Generate an opaque refresh token: 32 bytes from the OS RNG, lowercase hex.
pub fn generate_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
