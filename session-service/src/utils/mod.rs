pub mod password;
pub mod validation;

pub use password::{burn_verification, hash_password, verify_password, Password, PasswordHashString};
pub use validation::ValidatedJson;
