pub mod refresh_token;
pub mod user;

pub use refresh_token::{generate_token, RefreshToken, REFRESH_TOKEN_BYTES, REFRESH_TOKEN_EXPIRY_DAYS};
pub use user::{User, UserResponse};
