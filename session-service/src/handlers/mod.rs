pub mod health;
pub mod metrics;
pub mod session;

pub use health::health_check;
pub use session::{login, me, refresh, revoke, revoke_user_sessions};
