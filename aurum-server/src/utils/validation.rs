//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Lengths count characters, not bytes, so CJK text gets the same limit.

use shared::models::{AmountInput, ShiftKind};

use crate::money;
use crate::utils::AppError;

// ── Limits ──────────────────────────────────────────────────────────

/// Order number (VARCHAR(32))
pub const MAX_ORDER_NO_LEN: usize = 32;

/// Expense category (VARCHAR(50))
pub const MAX_CATEGORY_LEN: usize = 50;

/// Order memo / expense note
pub const MAX_NOTE_LEN: usize = 500;

/// Login code
pub const MAX_CODE_LEN: usize = 64;

/// Passwords and pins (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// NUMERIC(14,2)
pub const MAX_AMOUNT: f64 = 999_999_999_999.99;

/// Largest page a list endpoint returns
pub const MAX_PAGE_SIZE: u32 = 200;

// ── Text ────────────────────────────────────────────────────────────

/// Trim a required string, reject empty or overlong values.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty"))
            .with_detail("field", field));
    }
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        ))
        .with_detail("field", field));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional string; blank becomes `None`.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<Option<String>, AppError> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let len = trimmed.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        ))
        .with_detail("field", field));
    }
    Ok(Some(trimmed.to_string()))
}

// ── Ledger values ───────────────────────────────────────────────────

/// Positive, finite amount within NUMERIC(14,2), rounded to cents.
pub fn validate_amount(input: &AmountInput) -> Result<f64, AppError> {
    let value = input
        .value()
        .ok_or_else(|| AppError::invalid_amount("amount must be a number"))?;
    if !value.is_finite() {
        return Err(AppError::invalid_amount("amount must be a finite number"));
    }
    let rounded = money::round_money(value);
    if rounded <= 0.0 {
        return Err(AppError::invalid_amount(format!(
            "amount must be greater than 0, got {value}"
        )));
    }
    if rounded > MAX_AMOUNT {
        return Err(AppError::invalid_amount(format!(
            "amount exceeds maximum allowed ({MAX_AMOUNT})"
        )));
    }
    Ok(rounded)
}

/// Parse a shift code, label or alias.
pub fn validate_shift(value: &str) -> Result<ShiftKind, AppError> {
    ShiftKind::parse(value).ok_or_else(|| AppError::invalid_shift(value))
}

/// `page >= 1`, `1 <= page_size <= 200`
pub fn validate_paging(page: u32, page_size: u32) -> Result<(), AppError> {
    if page < 1 {
        return Err(AppError::with_message(
            shared::error::ErrorCode::ValueOutOfRange,
            "page must be >= 1",
        ));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(AppError::with_message(
            shared::error::ErrorCode::ValueOutOfRange,
            format!("page_size must be between 1 and {MAX_PAGE_SIZE}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_required_text() {
        assert_eq!(
            validate_required_text("  A001 ", "order_no", MAX_ORDER_NO_LEN).unwrap(),
            "A001"
        );
        assert!(validate_required_text("   ", "order_no", MAX_ORDER_NO_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(33), "order_no", MAX_ORDER_NO_LEN).is_err());
        // 50 CJK chars fit even though they are 150 bytes
        assert!(validate_required_text(&"食".repeat(50), "category", MAX_CATEGORY_LEN).is_ok());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(validate_optional_text(None, "memo", 500).unwrap(), None);
        assert_eq!(validate_optional_text(Some("  "), "memo", 500).unwrap(), None);
        assert_eq!(
            validate_optional_text(Some(" hi "), "memo", 500).unwrap(),
            Some("hi".into())
        );
        assert!(validate_optional_text(Some(&"m".repeat(501)), "memo", 500).is_err());
    }

    #[test]
    fn test_amount_rules() {
        assert_eq!(validate_amount(&AmountInput::Number(10.126)).unwrap(), 10.13);
        assert_eq!(
            validate_amount(&AmountInput::Text("1,200".into())).unwrap(),
            1200.0
        );
        for bad in [
            AmountInput::Number(0.0),
            AmountInput::Number(-5.0),
            AmountInput::Number(0.001),
            AmountInput::Number(1e15),
            AmountInput::Text("abc".into()),
            AmountInput::Text("NaN".into()),
        ] {
            let err = validate_amount(&bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidAmount, "{bad:?}");
        }
    }

    #[test]
    fn test_shift_and_paging() {
        assert_eq!(validate_shift("早班").unwrap(), ShiftKind::Morning);
        assert_eq!(validate_shift("x").unwrap_err().code, ErrorCode::InvalidShift);

        assert!(validate_paging(1, 20).is_ok());
        assert!(validate_paging(1, 200).is_ok());
        assert!(validate_paging(0, 20).is_err());
        assert!(validate_paging(1, 0).is_err());
        assert!(validate_paging(1, 201).is_err());
    }
}
