//! Error types for tsocial.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Context returned to a suspended account at login so the client can
/// render the suspension screen and the appeal form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspensionNotice {
    /// Reason recorded by the suspending administrator.
    pub reason: String,
    /// Handle of the suspending administrator.
    pub suspended_by: String,
    /// Display name of the suspending administrator.
    pub admin_name: String,
    /// Display name of the suspended account.
    pub user_name: String,
    /// `pending`, `rejected` or absent.
    pub appeal_status: Option<String>,
    /// Text of the filed appeal, if any.
    pub appeal_text: Option<String>,
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A moderation transition was attempted from a state that does not allow it.
    #[error("{0}")]
    StateConflict(String),

    #[error("Account suspended")]
    AccountSuspended(Box<SuspensionNotice>),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::UserNotFound(_) | Self::PostNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Unauthorized | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) | Self::AccountSuspended(_) => StatusCode::FORBIDDEN,
            // State conflicts share 400 with validation failures; clients key on `code`.
            Self::BadRequest(_) | Self::Validation(_) | Self::StateConflict(_) => {
                StatusCode::BAD_REQUEST
            }

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::PostNotFound(_) => "POST_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::StateConflict(_) => "STATE_CONFLICT",
            Self::AccountSuspended(_) => "ACCOUNT_SUSPENDED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Builds the JSON body sent to the client.
    #[must_use]
    pub fn body(&self) -> Value {
        let mut body = json!({
            "error": self.to_string(),
            "code": self.error_code(),
        });

        if let Self::AccountSuspended(notice) = self {
            if let (Some(obj), Ok(Value::Object(extra))) =
                (body.as_object_mut(), serde_json::to_value(notice.as_ref()))
            {
                obj.extend(extra);
                obj.insert("isSuspended".to_string(), Value::Bool(true));
            }
        }

        body
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        (status, Json(self.body())).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
