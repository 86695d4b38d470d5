//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category, customer
pub const MAX_NAME_LEN: usize = 200;

/// Notes and descriptions (line note, product description)
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, neighborhood
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Maximum unit price accepted for a product
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Maximum quantity per cart line or add-on
pub const MAX_QUANTITY: i64 = 9999;

/// Maximum lines per cart
pub const MAX_CART_LINES: usize = 200;

/// Maximum add-ons per cart line
pub const MAX_ADD_ONS_PER_LINE: usize = 20;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
///
/// Only emptiness is checked on the trimmed value; the value itself is stored as given.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(
            AppError::with_message(ErrorCode::RequiredField, format!("{field} must not be empty"))
                .with_detail("field", field),
        );
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
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

/// Validate a product price: finite, positive, below [`MAX_PRICE`]
pub fn validate_price(value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 || value > MAX_PRICE {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("price must be in (0, {MAX_PRICE}], got {value}"),
        ));
    }
    Ok(())
}

/// Validate a line or add-on quantity: integer in 1..=[`MAX_QUANTITY`]
pub fn validate_quantity(value: i64, field: &str) -> Result<(), AppError> {
    if !(1..=MAX_QUANTITY).contains(&value) {
        return Err(AppError::with_message(
            ErrorCode::InvalidQuantity,
            format!("{field} must be between 1 and {MAX_QUANTITY}, got {value}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}
