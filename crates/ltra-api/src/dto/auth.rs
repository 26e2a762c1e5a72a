//! Authentication DTOs

use chrono::{DateTime, Utc};
use ltra_core::models::{AppRole, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sign-in request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid e-mail address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Sign-in response; the token is also set as the `token` cookie
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub role: Option<AppRole>,
    pub user: User,
}

impl From<ltra_services::LoginResult> for LoginResponse {
    fn from(result: ltra_services::LoginResult) -> Self {
        Self {
            token: result.token,
            token_type: "Bearer",
            expires_in: result.expires_in,
            role: result.role,
            user: result.user,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub role: Option<AppRole>,
    pub token_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 8, message = "New password is too short"))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            email: "admin@ltra.gov.la".to_string(),
            password: "password".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = LoginRequest {
            email: "admin".to_string(),
            password: String::new(),
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_change_password_minimum_length() {
        let req = ChangePasswordRequest {
            current_password: "old".to_string(),
            new_password: "short".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
