pub mod audit_log_service;
pub mod auth_service;
pub mod cart_item_service;
pub mod cart_service;
pub mod category_service;
pub mod currency_service;
pub mod inventory_service;
pub mod order_item_service;
pub mod order_service;
pub mod product_service;
pub mod transaction_log_service;
pub mod user_service;

use crate::error::{AppError, AppResult};

/// Trims a mandatory text field, rejecting blanks.
pub(crate) fn require_text(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

/// Trims an optional text field; blanks become `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn require_positive(value: i32, field: &str) -> AppResult<i32> {
    if value <= 0 {
        return Err(AppError::BadRequest(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(value)
}
