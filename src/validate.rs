use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use uuid::Uuid;

use crate::error::ApiError;

// --- Format Rules ---

// One non-space local part, one host part, one dot-separated TLD.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

// "$400" or "$200-500": dollar sign, three digits, optional three-digit upper bound.
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\d{3}(-\d{3})?$").expect("valid price regex"));

// Accepted date spellings. Artist birth dates keep the original string; exhibition
// dates are parsed into real calendar values.
const ARTIST_DOB_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d %B %Y"];
const EXHIBITION_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d-%m-%Y"];

/// Checks the email shape shared by users, artists, and contact inquiries.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ApiError::InvalidInput("Invalid email format.".to_string()))
    }
}

/// Checks the artwork display price, e.g. "$400" or "$200-500".
pub fn validate_price(price: &str) -> Result<(), ApiError> {
    if PRICE_RE.is_match(price) {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(
            "Price must look like $400 or $200-500.".to_string(),
        ))
    }
}

/// parse_artist_dob
///
/// Accepts "YYYY-MM-DD" or "DD Month YYYY" (e.g. "15 March 1990") and returns
/// the input unchanged: birth dates are stored as the string the admin typed,
/// only their shape is checked.
pub fn parse_artist_dob(raw: &str) -> Result<String, ApiError> {
    for format in ARTIST_DOB_FORMATS {
        if NaiveDate::parse_from_str(raw, format).is_ok() {
            return Ok(raw.to_string());
        }
    }
    Err(ApiError::InvalidInput(
        "Invalid date of birth. Use YYYY-MM-DD or a spelled-out date like 15 March 1990."
            .to_string(),
    ))
}

/// parse_exhibition_date
///
/// Accepts "YYYY-MM-DD" or "DD-MM-YYYY" and returns the calendar date, so
/// range checks compare real dates rather than strings.
pub fn parse_exhibition_date(raw: &str) -> Result<NaiveDate, ApiError> {
    for format in EXHIBITION_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    Err(ApiError::InvalidInput(
        "Invalid date. Use YYYY-MM-DD or DD-MM-YYYY.".to_string(),
    ))
}

/// Parses a path or payload identifier, naming the entity in the rejection so
/// "GET /artists/not-a-uuid" answers with a clear 400 instead of a bare parse
/// failure.
pub fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::InvalidInput(format!("Invalid {entity} id.")))
}
