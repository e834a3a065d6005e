pub mod auth;
pub mod cart;
pub mod credit;
pub mod members;
pub mod orders;
pub mod products;
pub mod reviews;

use crate::error::{AppError, AppResult};

/// Rejects empty or whitespace-only required text.
pub(crate) fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be blank")));
    }
    Ok(())
}

pub(crate) fn max_len(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.trim().chars().count() > max {
        return Err(AppError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// `Some` only for non-blank input.
pub(crate) fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
