use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::services::AuthError;

/// `iss` claim of every access token this service mints and accepts.
pub const ISSUER: &str = "chirpy";

/// Claims for access tokens (short-lived)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// JWT ID
    #[serde(default)]
    pub jti: String,
}

impl AccessTokenClaims {
    fn new(user_id: Uuid, ttl: Duration) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = now.checked_add_signed(ttl).ok_or_else(|| {
            AuthError::Internal(anyhow::anyhow!("Access token lifetime out of range"))
        })?;

        Ok(Self {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Parse the subject back into the identity it names.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::MalformedSubject)
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation
}

fn encode_claims(claims: &AccessTokenClaims, key: &EncodingKey) -> Result<String, AuthError> {
    encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|e| AuthError::Internal(anyhow::anyhow!("Failed to encode access token: {}", e)))
}

fn decode_claims_with(token: &str, key: &DecodingKey) -> Result<AccessTokenClaims, AuthError> {
    decode::<AccessTokenClaims>(token, key, &validation())
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => {
                tracing::debug!(error = %e, "Access token rejected");
                AuthError::MalformedCredential("invalid access token")
            }
        })
}

/// Mint an HS256 access token binding `user_id` for `ttl`.
pub fn make_access_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode_claims(&AccessTokenClaims::new(user_id, ttl)?, &key)
}

/// Verify signature, issuer and expiry, then return the bound identity.
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    decode_claims_with(token, &key)?.user_id()
}

/// Access token codec holding the signing key and configured lifetime.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, AuthError> {
        let access_token_ttl = Duration::try_minutes(config.access_token_expiry_minutes)
            .ok_or_else(|| {
                AuthError::Internal(anyhow::anyhow!(
                    "ACCESS_TOKEN_EXPIRY_MINUTES out of range: {}",
                    config.access_token_expiry_minutes
                ))
            })?;

        let secret = config.secret.expose_secret().as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_token_ttl,
        })
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        encode_claims(
            &AccessTokenClaims::new(user_id, self.access_token_ttl)?,
            &self.encoding_key,
        )
    }

    pub fn decode_claims(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        decode_claims_with(token, &self.decoding_key)
    }

    pub fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        self.decode_claims(token)?.user_id()
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }
}
