//! Error type shared by every layer of the console back end
//!
//! [`AppError`] maps itself to an HTTP status and a stable error code. Client
//! errors carry their detail to the caller; storage and internal failures are
//! logged and replaced by a generic Vietnamese message for the console toast.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Toast text shown for any failure the user cannot act on
pub const GENERIC_FAILURE: &str = "Đã xảy ra lỗi. Vui lòng thử lại sau.";

/// Toast text shown when the data store cannot be reached
pub const STORAGE_UNAVAILABLE: &str = "Không thể kết nối tới cơ sở dữ liệu. Vui lòng thử lại sau.";

#[derive(Error, Debug)]
pub enum AppError {
    // storage
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Cache connection failed: {0}")]
    CacheConnection(String),

    // session
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("User inactive: {0}")]
    UserInactive(String),

    // request
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Carries a message meant for the user as-is
    #[error("{0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // process
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        use AppError::*;
        match self {
            Validation(_) | InvalidInput(_) | MissingField(_) => StatusCode::BAD_REQUEST,
            InvalidCredentials | InvalidToken(_) | TokenExpired => StatusCode::UNAUTHORIZED,
            Forbidden | Unauthorized(_) | UserInactive(_) => StatusCode::FORBIDDEN,
            NotFound(_) => StatusCode::NOT_FOUND,
            Conflict(_) | AlreadyExists(_) => StatusCode::CONFLICT,
            Database(_) | Pool(_) | Cache(_) | CacheConnection(_) | PasswordHash(_)
            | Internal(_) | Config(_) | Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable code for the `error` field of the JSON body
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Cache(_) => "cache_error",
            AppError::CacheConnection(_) => "cache_connection_error",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::TokenExpired => "token_expired",
            AppError::InvalidToken(_) => "invalid_token",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::PasswordHash(_) => "password_error",
            AppError::UserInactive(_) => "user_inactive",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// True for failures caused by the back end rather than the request
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message sent to the console for display in a toast
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Pool(_) => STORAGE_UNAVAILABLE.to_string(),
            _ if self.is_server_error() => GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        }

        HttpResponse::build(status).json(json!({
            "error": self.error_code(),
            "message": self.user_message(),
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => AppError::Pool(err.to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::AlreadyExists(db.message().to_string())
            }
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::NotFound("application".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::MissingField("enterprise_id".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("duplicate".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::InvalidCredentials.error_code(),
            "invalid_credentials"
        );
        assert_eq!(
            AppError::MissingField("type".to_string()).error_code(),
            "missing_field"
        );
        assert_eq!(
            AppError::Database("boom".to_string()).error_code(),
            "database_error"
        );
    }

    #[test]
    fn test_conflict_message_is_verbatim() {
        let err = AppError::Conflict("Người dùng đã có vai trò này".to_string());
        assert_eq!(err.to_string(), "Người dùng đã có vai trò này");
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = AppError::Database("relation \"licenses\" does not exist".to_string());
        assert_eq!(err.user_message(), STORAGE_UNAVAILABLE);

        let err = AppError::Serialization("trailing comma".to_string());
        assert_eq!(err.user_message(), GENERIC_FAILURE);

        let err = AppError::MissingField("enterprise_id".to_string());
        assert_eq!(err.user_message(), "Missing required field: enterprise_id");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
