//! Short code generation and validation utilities.
//!
//! Generated codes are derived from the long URL, so the same URL always
//! yields the same first candidate. Collisions are resolved by salting the
//! hash input with the attempt number.

use crate::error::AppError;
use serde_json::json;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
pub const CODE_LENGTH: usize = 6;

const ALIAS_MIN_LENGTH: usize = 3;
const ALIAS_MAX_LENGTH: usize = 32;

/// Reserved codes that cannot be used as short links.
///
/// These collide with fixed HTTP routes.
pub const RESERVED_CODES: &[&str] = &[
    "shorten",
    "search",
    "analytics",
    "update-shortcode",
    "health",
    "users",
    "api",
];

/// Derives the default short code for `long_url`.
///
/// Returns the first six lowercase hex characters of SHA-256 over the URL bytes.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code("example.com/a");
/// assert_eq!(code.len(), 6);
/// assert_eq!(code, generate_code("example.com/a"));
/// ```
pub fn generate_code(long_url: &str) -> String {
    let digest = Sha256::digest(long_url.as_bytes());
    let mut code = hex::encode(digest);
    code.truncate(CODE_LENGTH);
    code
}

/// Returns the code tried on attempt `attempt` (zero-based).
///
/// Attempt 0 is [`generate_code`]; later attempts hash `long_url#attempt`.
pub fn candidate_code(long_url: &str, attempt: u32) -> String {
    if attempt == 0 {
        generate_code(long_url)
    } else {
        generate_code(&format!("{}#{}", long_url, attempt))
    }
}

/// Validates a caller-chosen alias.
///
/// # Rules
///
/// - Length: 3-32 characters
/// - Allowed characters: ASCII letters, digits, hyphens, underscores
/// - Cannot start or end with a hyphen
/// - Cannot be a reserved route word
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_alias(alias: &str) -> Result<(), AppError> {
    let length = alias.chars().count();
    if !(ALIAS_MIN_LENGTH..=ALIAS_MAX_LENGTH).contains(&length) {
        return Err(AppError::bad_request(
            format!(
                "Alias must be {}-{} characters",
                ALIAS_MIN_LENGTH, ALIAS_MAX_LENGTH
            ),
            json!({ "provided_length": length }),
        ));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "Alias can only contain letters, digits, hyphens and underscores",
            json!({ "alias": alias }),
        ));
    }

    if alias.starts_with('-') || alias.ends_with('-') {
        return Err(AppError::bad_request(
            "Alias cannot start or end with a hyphen",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(alias))
    {
        return Err(AppError::bad_request(
            "This alias is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
