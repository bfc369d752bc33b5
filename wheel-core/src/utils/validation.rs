//! Input validation helpers

use super::AppError;
use shared::error::ErrorCode;

// ── Text length limits ──────────────────────────────────────────────

/// Display names: participants, restaurants, menu items
pub const MAX_NAME_LEN: usize = 200;

/// Chat message body
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Notification title / content
pub const MAX_NOTIFICATION_LEN: usize = 500;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Money limits ────────────────────────────────────────────────────

/// Maximum single price or fee (฿1,000,000)
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// Maximum quantity per line item
pub const MAX_QUANTITY: u32 = 9999;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate a money value: finite, non-negative, bounded
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::with_message(
            ErrorCode::InvalidAmount,
            format!("{field} must be a finite number, got {value}"),
        )
        .with_detail("field", field));
    }
    if value < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidAmount,
            format!("{field} must be non-negative, got {value}"),
        )
        .with_detail("field", field));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::with_message(
            ErrorCode::InvalidAmount,
            format!("{field} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}
