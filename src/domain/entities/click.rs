//! Click entity representing a single successful resolution.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Placeholder recorded when the request carries no `User-Agent`.
pub const UNKNOWN_USER_AGENT: &str = "Unknown";

/// Placeholder recorded when the request carries no `Referer`.
pub const DIRECT_REFERRER: &str = "Direct";

/// An immutable click event stored for analytics.
///
/// Identified by `(short_code, timestamp)`. All metadata fields are plain
/// strings; missing values are stored as placeholders, never as nulls.
#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub short_code: String,
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
    pub referrer: String,
    pub user_agent: String,
    pub geo_location: String,
}

static NEXT_EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one click, stored alongside its cells so a
/// retried write can recognise its own earlier attempt.
fn next_event_id() -> String {
    format!(
        "{:x}-{:x}",
        std::process::id(),
        NEXT_EVENT_SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

/// Input data for recording a new click event.
///
/// `occurred_at` is the resolution time and seeds the row key; the
/// repository only moves it forward by a nanosecond on a key collision.
/// Clones share `event_id`, so every retry of one click writes the same cells.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub short_code: String,
    pub ip_address: String,
    pub referrer: String,
    pub user_agent: String,
    pub geo_location: String,
    pub occurred_at: DateTime<Utc>,
    pub event_id: String,
}

impl NewClick {
    /// Builds a click, substituting placeholders for missing header values.
    pub fn new(
        short_code: impl Into<String>,
        ip_address: impl Into<String>,
        referrer: Option<String>,
        user_agent: Option<String>,
        geo_location: Option<String>,
    ) -> Self {
        Self {
            short_code: short_code.into(),
            ip_address: ip_address.into(),
            referrer: referrer
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DIRECT_REFERRER.to_string()),
            user_agent: user_agent
                .filter(|ua| !ua.is_empty())
                .unwrap_or_else(|| UNKNOWN_USER_AGENT.to_string()),
            geo_location: geo_location.unwrap_or_default(),
            occurred_at: Utc::now(),
            event_id: next_event_id(),
        }
    }

    /// Overrides the event time, e.g. with the moment the link was resolved.
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }
}
