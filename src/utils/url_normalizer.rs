//! Destination URL validation and normalization.
//!
//! Long URLs are stored as submitted. A missing scheme is tolerated at
//! creation and filled in with `https://` when the destination is served.

use url::Url;

/// Errors that can occur while validating a long URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Long URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,
}

fn has_http_scheme(input: &str) -> bool {
    let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Returns the redirect target for a stored long URL.
///
/// URLs without an `http://` or `https://` scheme get `https://` prepended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_destination("example.com/a"), "https://example.com/a");
/// assert_eq!(normalize_destination("http://example.com"), "http://example.com");
/// ```
pub fn normalize_destination(long_url: &str) -> String {
    let trimmed = long_url.trim();
    if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Validates a submitted long URL and returns the value to store.
///
/// The URL must be non-empty and, once normalized, parse as an HTTP(S) URL
/// with a host. Dangerous schemes such as `javascript:` fail to parse after
/// the `https://` prefix is added and are rejected.
///
/// # Errors
///
/// Returns [`UrlNormalizationError`] describing the first rule violated.
pub fn validate_long_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let url = Url::parse(&normalize_destination(trimmed))
        .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    Ok(trimmed.to_string())
}
