use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::UserResponse;
use crate::services::Session;

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Identity fields plus both tokens.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

impl From<Session> for LoginResponse {
    fn from(session: Session) -> Self {
        Self {
            user: session.user,
            token: session.access_token,
            refresh_token: session.refresh_token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RevokeSessionsResponse {
    pub revoked: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    #[test]
    fn login_response_is_flat() {
        let user = User::new("a@b.com".to_string(), "hash".to_string());
        let response = LoginResponse::from(Session {
            user: user.sanitized(),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        });

        let json = serde_json::to_value(&response).unwrap();
        for field in ["id", "created_at", "updated_at", "email", "is_chirpy_red", "token", "refresh_token"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert!(json.get("user").is_none());
    }

    #[test]
    fn login_request_validation() {
        let ok = LoginRequest {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        assert!(bad.validate().is_err());
        assert!(!format!("{:?}", ok).contains("secret1"));
    }
}
