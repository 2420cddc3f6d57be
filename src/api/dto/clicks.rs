//! DTOs for click analytics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Click;

/// Request body for `POST /analytics/details`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClickDetailsRequest {
    #[validate(length(min = 1, message = "shortCode is required"))]
    pub short_code: String,
}

/// One recorded click.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickDetail {
    pub short_code: String,
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
    pub referrer: String,
    pub user_agent: String,
    pub geo_location: String,
}

impl From<Click> for ClickDetail {
    fn from(click: Click) -> Self {
        Self {
            short_code: click.short_code,
            timestamp: click.timestamp,
            ip_address: click.ip_address,
            referrer: click.referrer,
            user_agent: click.user_agent,
            geo_location: click.geo_location,
        }
    }
}
