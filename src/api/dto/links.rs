//! DTOs for link rename, deletion and listing.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::LinkSummary;

/// Request body for `PUT /update-shortcode`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    #[validate(length(min = 1, message = "oldCode is required"))]
    pub old_code: String,

    #[validate(length(min = 1, message = "newCode is required"))]
    pub new_code: String,
}

/// Response of `DELETE /{code}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: String,
}

/// Query string of `GET /search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// A link with its click count.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummaryResponse {
    pub short_code: String,
    pub long_url: String,
    pub click_count: u64,
}

impl From<LinkSummary> for LinkSummaryResponse {
    fn from(summary: LinkSummary) -> Self {
        Self {
            short_code: summary.short_code,
            long_url: summary.long_url,
            click_count: summary.click_count,
        }
    }
}
