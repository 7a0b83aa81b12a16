//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or invalid request input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No user with the given name
    #[error("User does not exist")]
    UserNotExist,

    /// Wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No pending verification code for the target (never sent or expired)
    #[error("Verification code has expired")]
    VerificationCodeExpired,

    /// Submitted verification code differs from the pending one
    #[error("Verification code does not match")]
    VerificationCodeMismatch,

    /// Account could not be created
    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    /// Token signing failed
    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    /// Request carries no valid token or session
    #[error("Authentication required")]
    Unauthorized,

    /// Relational or cache store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Verification mail could not be issued
    #[error("Mail delivery failed: {0}")]
    MailSend(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidRequest(_) | AuthError::VerificationCodeMismatch => {
                StatusCode::BAD_REQUEST
            }
            AuthError::UserNotExist => StatusCode::NOT_FOUND,
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::VerificationCodeExpired => StatusCode::GONE,
            AuthError::RegistrationFailed(_) => StatusCode::CONFLICT,
            AuthError::MailSend(_) => StatusCode::BAD_GATEWAY,
            AuthError::TokenCreation(_) | AuthError::Storage(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidRequest(_) | AuthError::VerificationCodeMismatch => {
                ErrorKind::BadRequest
            }
            AuthError::UserNotExist => ErrorKind::NotFound,
            AuthError::InvalidCredentials | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::VerificationCodeExpired => ErrorKind::Gone,
            AuthError::RegistrationFailed(_) => ErrorKind::Conflict,
            AuthError::MailSend(_) => ErrorKind::BadGateway,
            AuthError::TokenCreation(_) | AuthError::Storage(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Stable business error code carried in the response envelope
    pub fn code(&self) -> u32 {
        match self {
            AuthError::InvalidCredentials => 1002,
            AuthError::UserNotExist => 1003,
            AuthError::RegistrationFailed(_) => 1006,
            AuthError::VerificationCodeExpired => 1008,
            AuthError::VerificationCodeMismatch => 1009,
            AuthError::MailSend(_) => 1010,
            AuthError::Unauthorized => 1201,
            AuthError::TokenCreation(_) => 1202,
            AuthError::InvalidRequest(_) => 9001,
            AuthError::Storage(_) => 9004,
            AuthError::Internal(_) => 9999,
        }
    }

    /// Message shown to the client
    ///
    /// Server-side causes stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AuthError::InvalidRequest(_)
            | AuthError::UserNotExist
            | AuthError::InvalidCredentials
            | AuthError::VerificationCodeExpired
            | AuthError::VerificationCodeMismatch
            | AuthError::Unauthorized => self.to_string(),
            AuthError::RegistrationFailed(_) => "Registration failed".to_string(),
            AuthError::TokenCreation(_) => "Token creation failed".to_string(),
            AuthError::Storage(_) => "Storage operation failed".to_string(),
            AuthError::MailSend(_) => "Failed to send verification code".to_string(),
            AuthError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.public_message()).with_code(self.code())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Storage(cause) => {
                tracing::error!(error = %cause, "Auth storage error");
            }
            AuthError::Internal(cause) | AuthError::TokenCreation(cause) => {
                tracing::error!(error = %cause, "Auth internal error");
            }
            AuthError::MailSend(cause) => {
                tracing::error!(error = %cause, "Verification mail failed");
            }
            AuthError::RegistrationFailed(cause) => {
                tracing::warn!(reason = %cause, "Registration failed");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::VerificationCodeMismatch => {
                tracing::warn!("Verification code mismatch");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Storage(err.to_string())
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::InvalidRequest(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}
