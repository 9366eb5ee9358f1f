use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;

use crate::services::AuthError;

/// Newtype for password to prevent accidental logging
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Newtype for password hash
#[derive(Clone)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for PasswordHashString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHashString(<redacted>)")
    }
}

/// Hash a password using Argon2
///
/// Uses Argon2id variant with secure default parameters.
/// Salt is automatically generated and included in the hash.
pub fn hash_password(password: &Password) -> Result<PasswordHashString, AuthError> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2
        .hash_password(password.as_str().as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .to_string();

    Ok(PasswordHashString::new(password_hash))
}

/// Verify a password against a hash using constant-time comparison
///
/// Returns `PasswordMismatch` on a wrong password and `Hash` when the stored
/// hash cannot be parsed.
pub fn verify_password(
    password: &Password,
    password_hash: &PasswordHashString,
) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(password_hash.as_str())
        .map_err(|e| AuthError::Hash(format!("Invalid password hash format: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_str().as_bytes(), &parsed_hash)
        .map_err(|e| match e {
            argon2::password_hash::Error::Password => AuthError::PasswordMismatch,
            other => AuthError::Hash(other.to_string()),
        })
}

/// Spend one verification's worth of work against a fixed hash.
///
/// Used when no identity matched, so "unknown email" costs the same as
/// "wrong password".
pub fn burn_verification(password: &Password) {
    static DUMMY_HASH: OnceLock<Option<PasswordHashString>> = OnceLock::new();

    let dummy = DUMMY_HASH.get_or_init(|| {
        hash_password(&Password::new("timing-equalisation-placeholder".to_string())).ok()
    });

    if let Some(hash) = dummy {
        let _ = verify_password(password, hash);
    }
}
