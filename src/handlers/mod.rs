//! Request handlers, one module per resource. Shared between them are the
//! two gates every mutating endpoint passes first: the admin check and the
//! required-field check.

use crate::{error::ApiError, models::Role};

pub mod artists;
pub mod artworks;
pub mod banners;
pub mod contacts;
pub mod exhibitions;
pub mod users;

/// The admin gate. Runs before any parsing, lookup, or upload so a forbidden
/// request leaves no trace anywhere.
pub(crate) fn require_admin(role: Role, action: &str) -> Result<(), ApiError> {
    if role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!("Only admins can {action}.")))
    }
}

/// Unwraps a required JSON field. Absent, empty, and whitespace-only all fail
/// the same way, with the wire-format field name in the message.
pub(crate) fn require_field(value: Option<&str>, field: &str) -> Result<String, ApiError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ApiError::InvalidInput(format!(
            "Missing required field: {field}."
        ))),
    }
}
