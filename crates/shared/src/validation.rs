//! Common validation utilities.

use validator::ValidationError;

lazy_static::lazy_static! {
    /// Plan codes look like `<majorGroup>-<variant>`, e.g. `8-4`.
    pub static ref PLAN_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9]+-[A-Za-z0-9]+$").unwrap();

    /// Continent codes are two lowercase ASCII letters.
    pub static ref CONTINENT_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z]{2}$").unwrap();
}

/// Returns true if `code` is a well-formed plan code.
pub fn is_plan_code(code: &str) -> bool {
    PLAN_CODE_REGEX.is_match(code)
}

/// Returns true if `code` is a well-formed continent code.
pub fn is_continent_code(code: &str) -> bool {
    CONTINENT_CODE_REGEX.is_match(code)
}

/// Validates a client-supplied continent code (case-insensitive).
pub fn validate_continent_code(code: &str) -> Result<(), ValidationError> {
    if is_continent_code(&code.to_ascii_lowercase()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("continent_code_format");
        err.message = Some("Continent code must be two letters".into());
        Err(err)
    }
}
