//! Unified error codes for AurumLedger
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Ledger errors (orders, expenses)
//! - 4xxx: Report errors
//! - 5xxx: Backup errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so API clients can match
/// on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (code/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// No account has been set up yet
    AccountNotInitialized = 1005,
    /// Account setup was already completed
    AccountAlreadyInitialized = 1006,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Revenue figures need a second verification
    RevenueVerificationRequired = 2002,

    // ==================== 3xxx: Ledger ====================
    /// Order not found
    OrderNotFound = 3001,
    /// Expense not found
    ExpenseNotFound = 3002,
    /// Amount is not a positive number
    InvalidAmount = 3003,
    /// Shift is neither morning nor evening
    InvalidShift = 3004,
    /// Date is not YYYY-MM-DD
    InvalidDate = 3005,

    // ==================== 4xxx: Report ====================
    /// Period mode is not day/month/year
    InvalidPeriodMode = 4001,
    /// Date range is malformed
    InvalidDateRange = 4002,

    // ==================== 5xxx: Backup ====================
    /// Creating the backup archive failed
    BackupFailed = 5001,
    /// Uploaded archive is not usable
    InvalidArchive = 5002,
    /// Restoring from an archive failed
    RestoreFailed = 5003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// File system error
    StorageError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid code or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Invalid token",
            ErrorCode::AccountNotInitialized => "Account has not been set up",
            ErrorCode::AccountAlreadyInitialized => "Account is already set up",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RevenueVerificationRequired => "Revenue second verification required",

            // Ledger
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::ExpenseNotFound => "Expense not found",
            ErrorCode::InvalidAmount => "Amount must be greater than 0",
            ErrorCode::InvalidShift => "Shift must be MORNING or EVENING",
            ErrorCode::InvalidDate => "date must be YYYY-MM-DD",

            // Report
            ErrorCode::InvalidPeriodMode => "mode must be day, month or year",
            ErrorCode::InvalidDateRange => "Invalid date range",

            // Backup
            ErrorCode::BackupFailed => "Failed to create backup",
            ErrorCode::InvalidArchive => "Invalid backup archive",
            ErrorCode::RestoreFailed => "Failed to restore backup",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StorageError => "Storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a u16 does not map to an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountNotInitialized),
            1006 => Ok(ErrorCode::AccountAlreadyInitialized),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RevenueVerificationRequired),

            // Ledger
            3001 => Ok(ErrorCode::OrderNotFound),
            3002 => Ok(ErrorCode::ExpenseNotFound),
            3003 => Ok(ErrorCode::InvalidAmount),
            3004 => Ok(ErrorCode::InvalidShift),
            3005 => Ok(ErrorCode::InvalidDate),

            // Report
            4001 => Ok(ErrorCode::InvalidPeriodMode),
            4002 => Ok(ErrorCode::InvalidDateRange),

            // Backup
            5001 => Ok(ErrorCode::BackupFailed),
            5002 => Ok(ErrorCode::InvalidArchive),
            5003 => Ok(ErrorCode::RestoreFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);

        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::AccountAlreadyInitialized.code(), 1006);

        assert_eq!(ErrorCode::RevenueVerificationRequired.code(), 2002);

        assert_eq!(ErrorCode::OrderNotFound.code(), 3001);
        assert_eq!(ErrorCode::InvalidDate.code(), 3005);

        assert_eq!(ErrorCode::InvalidPeriodMode.code(), 4001);
        assert_eq!(ErrorCode::InvalidArchive.code(), 5002);

        assert_eq!(ErrorCode::InternalError.code(), 9001);
        assert_eq!(ErrorCode::StorageError.code(), 9004);
    }

    #[test]
    fn test_try_from_covers_every_variant() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidFormat,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::NotAuthenticated,
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::AccountNotInitialized,
            ErrorCode::AccountAlreadyInitialized,
            ErrorCode::PermissionDenied,
            ErrorCode::RevenueVerificationRequired,
            ErrorCode::OrderNotFound,
            ErrorCode::ExpenseNotFound,
            ErrorCode::InvalidAmount,
            ErrorCode::InvalidShift,
            ErrorCode::InvalidDate,
            ErrorCode::InvalidPeriodMode,
            ErrorCode::InvalidDateRange,
            ErrorCode::BackupFailed,
            ErrorCode::InvalidArchive,
            ErrorCode::RestoreFailed,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::ConfigError,
            ErrorCode::StorageError,
        ];

        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(4001), Ok(ErrorCode::InvalidPeriodMode));
        assert_eq!(ErrorCode::try_from(7001), Err(InvalidErrorCode(7001)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "3001");

        let code: ErrorCode = serde_json::from_str("2002").unwrap();
        assert_eq!(code, ErrorCode::RevenueVerificationRequired);

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(ErrorCode::InvalidDate.message(), "date must be YYYY-MM-DD");
        assert!(!ErrorCode::Success.message().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::ExpenseNotFound), "3002");
        assert_eq!(
            format!("{}", InvalidErrorCode(999)),
            "invalid error code: 999"
        );
    }
}
