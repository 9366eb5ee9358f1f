pub mod credentials;
pub mod database;
pub mod error;
pub mod identities;
pub mod jwt;
pub mod metrics;
pub mod refresh_tokens;
pub mod session;

pub use credentials::{extract_api_key, extract_bearer, extract_credential, Credential, CredentialError};
pub use database::Database;
pub use error::AuthError;
pub use identities::{IdentityStore, InMemoryIdentityStore};
pub use jwt::{make_access_token, validate_access_token, AccessTokenClaims, JwtService, ISSUER};
pub use refresh_tokens::{InMemoryRefreshTokenStore, PgRefreshTokenStore, RefreshTokenStore};
pub use session::{Session, SessionService, SessionState};
