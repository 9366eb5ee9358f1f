//! Parsing of the `Authorization` header into typed credentials.
//!
//! Pure functions over a `HeaderMap`: no storage, no crypto.

use axum::http::{header, HeaderMap};
use thiserror::Error;

use crate::services::AuthError;

pub const BEARER_SCHEME: &str = "Bearer";
pub const API_KEY_SCHEME: &str = "ApiKey";

/// A credential presented in the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    ApiKey(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("no authorization header found")]
    MissingHeader,

    #[error("invalid authorization header: {0}")]
    MalformedHeader(&'static str),

    #[error("API key is empty")]
    EmptyKey,
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::MissingHeader => AuthError::MissingCredential,
            CredentialError::MalformedHeader(reason) => AuthError::MalformedCredential(reason),
            CredentialError::EmptyKey => AuthError::MalformedCredential("empty api key"),
        }
    }
}

fn authorization(headers: &HeaderMap) -> Result<&str, CredentialError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(CredentialError::MissingHeader)?;

    let value = value
        .to_str()
        .map_err(|_| CredentialError::MalformedHeader("header is not visible ASCII"))?;

    if value.is_empty() {
        return Err(CredentialError::MissingHeader);
    }
    Ok(value)
}

/// Split `"<scheme> <rest>"` on the first single space. A bare scheme yields
/// an empty remainder.
fn split_scheme(value: &str) -> (&str, Option<&str>) {
    match value.split_once(' ') {
        Some((scheme, rest)) => (scheme, Some(rest)),
        None => (value, None),
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is case-sensitive and must be followed by exactly one space and
/// a token containing no further whitespace. `Bearer abc def` and
/// `Bearer  abc` are malformed; nothing is trimmed or split off.
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, CredentialError> {
    let value = authorization(headers)?;

    match split_scheme(value) {
        (BEARER_SCHEME, Some(token)) => {
            if token.is_empty() {
                return Err(CredentialError::MalformedHeader("missing bearer token"));
            }
            if token.chars().any(char::is_whitespace) {
                return Err(CredentialError::MalformedHeader("bearer token contains whitespace"));
            }
            Ok(token.to_string())
        }
        (BEARER_SCHEME, None) => Err(CredentialError::MalformedHeader("missing bearer token")),
        _ => Err(CredentialError::MalformedHeader("expected Bearer scheme")),
    }
}

/// Extract the key from `Authorization: ApiKey <key>`.
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, CredentialError> {
    let value = authorization(headers)?;

    match split_scheme(value) {
        (API_KEY_SCHEME, Some(key)) if !key.trim().is_empty() => Ok(key.to_string()),
        (API_KEY_SCHEME, _) => Err(CredentialError::EmptyKey),
        _ => Err(CredentialError::MalformedHeader("expected ApiKey scheme")),
    }
}

/// Classify whichever credential the request carries.
pub fn extract_credential(headers: &HeaderMap) -> Result<Credential, CredentialError> {
    let value = authorization(headers)?;

    match split_scheme(value).0 {
        BEARER_SCHEME => extract_bearer(headers).map(Credential::Bearer),
        API_KEY_SCHEME => extract_api_key(headers).map(Credential::ApiKey),
        _ => Err(CredentialError::MalformedHeader("unsupported authorization scheme")),
    }
}
