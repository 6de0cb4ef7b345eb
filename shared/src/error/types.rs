//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the error type every HTTP handler returns, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details (offending field, value, ...)
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create an unauthorized error (missing or unusable credentials)
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create an invalid credentials error
    ///
    /// The message is the same for unknown codes and wrong passwords.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    /// Create an invalid token error
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    /// Create a token expired error
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Create a file system error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::StorageError, msg)
    }

    /// Create an invalid date error for the given raw value
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidDate).with_detail("value", value.into())
    }

    /// Create an invalid amount error
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidAmount, msg)
    }

    /// Create an invalid shift error for the given raw value
    pub fn invalid_shift(value: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidShift).with_detail("value", value.into())
    }
}

/// Unified error response body
///
/// Every failed request answers with this envelope:
/// - `code`: numeric [`ErrorCode`]
/// - `message`: human-readable message
/// - `details`: additional error details (offending field, value, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<AppError> for ApiResponse {
    fn from(err: AppError) -> Self {
        Self {
            code: err.code,
            message: err.message,
            details: err.details,
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();

        // Log system errors
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(ApiResponse::from(self))).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        use axum::extract::rejection::JsonRejection;

        let code = match &rejection {
            JsonRejection::JsonDataError(_) => ErrorCode::ValidationFailed,
            _ => ErrorCode::InvalidFormat,
        };
        Self::with_message(code, rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::OrderNotFound);
        assert_eq!(err.code, ErrorCode::OrderNotFound);
        assert_eq!(err.message, "Order not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("order_no must not be empty")
            .with_detail("field", "order_no")
            .with_detail("max", 32);

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "order_no");
        assert_eq!(details.get("max").unwrap(), 32);
    }

    #[test]
    fn test_domain_constructors() {
        let err = AppError::invalid_date("2024-13-01");
        assert_eq!(err.code, ErrorCode::InvalidDate);
        assert_eq!(err.message, "date must be YYYY-MM-DD");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.details.unwrap().get("value").unwrap(), "2024-13-01");

        let err = AppError::invalid_shift("noon");
        assert_eq!(err.code, ErrorCode::InvalidShift);

        let err = AppError::invalid_amount("amount must be greater than 0");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_app_error_http_status() {
        assert_eq!(
            AppError::new(ErrorCode::OrderNotFound).http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::unauthorized().http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::new(ErrorCode::RevenueVerificationRequired).http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::storage("disk").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::validation("order_no must not be empty");
        assert_eq!(format!("{}", err), "order_no must not be empty");
    }

    #[test]
    fn test_api_response_error() {
        let err = AppError::new(ErrorCode::ExpenseNotFound).with_detail("id", 12);
        let response = ApiResponse::from(err);

        assert_eq!(response.code, ErrorCode::ExpenseNotFound);
        assert_eq!(response.message, "Expense not found");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_api_response_serialize() {
        let json = serde_json::to_value(ApiResponse::from(AppError::invalid_shift("noon"))).unwrap();
        assert_eq!(json["code"], 3004);
        assert_eq!(json["details"]["value"], "noon");

        let json = serde_json::to_string(&ApiResponse::from(AppError::unauthorized())).unwrap();
        assert!(json.contains("\"code\":1001"));
        assert!(!json.contains("details"));
    }
}
