//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: supplier name
pub const MAX_NAME_LEN: usize = 200;

/// Notes, free-text references
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, invoice number
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Maximum single monetary amount accepted at the boundary (1,000,000,000)
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
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
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

// ── Validation helpers (money) ──────────────────────────────────────

/// Amount must be finite, non-negative and below [`MAX_AMOUNT`].
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::invalid_amount(format!(
            "{field} must be a finite number, got {value}"
        ))
        .with_detail("field", field));
    }
    if value < 0.0 {
        return Err(AppError::invalid_amount(format!(
            "{field} must be non-negative, got {value}"
        ))
        .with_detail("field", field));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::invalid_amount(format!(
            "{field} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"
        ))
        .with_detail("field", field));
    }
    Ok(())
}
