pub mod session;

pub use session::{LoginRequest, LoginResponse, MeResponse, RefreshResponse, RevokeSessionsResponse};
