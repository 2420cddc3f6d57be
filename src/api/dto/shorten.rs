//! DTOs for link creation and link records.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::application::services::CreateLinkRequest;
use crate::domain::entities::LinkRecord;

/// Characters allowed in a custom alias.
static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]*$").expect("alias pattern compiles"));

const MAX_ALIAS_LEN: usize = 32;

/// Checks the alias the way the service will see it: trimmed, and blank
/// meaning "generate a code".
fn alias_shape(alias: &str) -> Result<(), ValidationError> {
    let alias = alias.trim();
    if alias.len() > MAX_ALIAS_LEN {
        return Err(ValidationError::new("length").with_message("Alias is too long".into()));
    }
    if !ALIAS_REGEX.is_match(alias) {
        return Err(
            ValidationError::new("regex").with_message("Invalid alias characters".into()),
        );
    }
    Ok(())
}

/// Request body for `POST /shorten`.
///
/// ```json
/// {
///   "longUrl": "example.com/a",
///   "userId": "u1",
///   "oneTime": false,
///   "expirationDate": "2030-01-01T00:00:00Z",
///   "customAlias": "promo"
/// }
/// ```
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    #[validate(length(min = 1, max = 2048, message = "longUrl is required"))]
    pub long_url: String,

    #[validate(length(min = 1, max = 256, message = "userId is required"))]
    pub user_id: String,

    #[serde(default)]
    pub one_time: bool,

    /// ISO-8601 instant; empty or absent means never.
    pub expiration_date: Option<String>,

    /// Blank or absent means generate a code.
    #[validate(custom(function = "alias_shape"))]
    pub custom_alias: Option<String>,
}

impl From<ShortenRequest> for CreateLinkRequest {
    fn from(request: ShortenRequest) -> Self {
        Self {
            long_url: request.long_url,
            owner_id: request.user_id,
            one_time_use: request.one_time,
            expiration: request.expiration_date,
            custom_alias: request.custom_alias,
        }
    }
}

/// JSON representation of a link record.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub short_code: String,
    pub long_url: String,
    pub user_id: String,
    pub creation_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub one_time: bool,
    pub is_active: bool,
    pub custom_alias: Option<String>,
}

impl From<LinkRecord> for LinkResponse {
    fn from(record: LinkRecord) -> Self {
        Self {
            short_code: record.short_code,
            long_url: record.long_url,
            user_id: record.owner_id,
            creation_date: record.creation_timestamp,
            expiration_date: record.expiration_timestamp,
            one_time: record.one_time_use,
            is_active: record.active,
            custom_alias: record.custom_alias,
        }
    }
}
