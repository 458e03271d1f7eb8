//! API error handling and response envelope
//!
//! Every response, success or failure, uses the same JSON envelope:
//! `{code, status, message, data?, error?}`.

use crate::auth::revocation::RevocationError;
use crate::auth::token::TokenError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use canteen_core::CanteenError;
use serde::{Deserialize, Serialize};

/// Response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status code, repeated in the body
    pub code: u16,
    /// "success", "fail" (caller error) or "error" (server error)
    pub status: String,
    /// Human-readable outcome of the operation
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::OK, message, Some(data))
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::CREATED, message, Some(data))
    }

    fn success(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code: status.as_u16(),
            status: "success".to_string(),
            message: message.into(),
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success envelope without a payload
    pub fn message(message: impl Into<String>) -> Self {
        Self::success(StatusCode::OK, message, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed header, body or id
    BadRequest(String),
    /// Signature, claims or role-class failure
    InvalidToken(String),
    /// Token present in the revocation store
    Expired,
    /// Role not permitted for the route
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    /// Store or database unreachable
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken(_) | AppError::Expired => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad data request",
            AppError::InvalidToken(_) | AppError::Expired => "failed to authenticate user",
            AppError::Unauthorized(_) => "failed to authorize user",
            AppError::NotFound(_) => "item not found",
            AppError::Conflict(_) => "duplicate item entry",
            AppError::Internal(_) => "internal server error",
        }
    }

    fn reason(&self) -> String {
        match self {
            AppError::BadRequest(reason)
            | AppError::InvalidToken(reason)
            | AppError::Unauthorized(reason)
            | AppError::NotFound(reason)
            | AppError::Conflict(reason) => reason.clone(),
            AppError::Expired => "token expired".to_string(),
            // Never leak infrastructure details to clients
            AppError::Internal(_) => "internal server error".to_string(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Internal(detail) => write!(f, "{}: {detail}", self.message()),
            _ => write!(f, "{}: {}", self.message(), self.reason()),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AppError::Internal(detail) = &self {
            tracing::error!(detail = %detail, "Request failed with internal error");
        }

        let body = ApiResponse::<()> {
            code: status.as_u16(),
            status: if status.is_server_error() { "error" } else { "fail" }.to_string(),
            message: self.message().to_string(),
            data: None,
            error: Some(self.reason()),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CanteenError> for AppError {
    fn from(err: CanteenError) -> Self {
        match err {
            CanteenError::NotFound(msg) => AppError::NotFound(msg),
            CanteenError::BadRequest(msg) => AppError::BadRequest(msg),
            CanteenError::Conflict(msg) => AppError::Conflict(msg),
            CanteenError::InvalidToken(msg) => AppError::InvalidToken(msg),
            CanteenError::Expired => AppError::Expired,
            CanteenError::Unauthorized(msg) => AppError::Unauthorized(msg),
            CanteenError::Database(msg) => AppError::Internal(format!("Database error: {msg}")),
            CanteenError::Config(msg) => AppError::Internal(format!("Configuration error: {msg}")),
            CanteenError::Internal(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(_) | TokenError::SystemTime(_) => {
                AppError::Internal(err.to_string())
            }
            _ => AppError::InvalidToken("invalid token".to_string()),
        }
    }
}

impl From<RevocationError> for AppError {
    fn from(err: RevocationError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("no matching record".to_string()),
            other => AppError::Internal(format!("Database error: {other}")),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
