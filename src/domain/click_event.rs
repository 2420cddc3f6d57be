//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

use crate::domain::entities::NewClick;

/// Request metadata supplied by the transport layer when resolving a code.
///
/// The HTTP collaborator extracts these from its headers; the core never
/// touches transport types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickContext {
    pub ip: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl ClickContext {
    pub fn new(ip: impl Into<String>, user_agent: Option<&str>, referrer: Option<&str>) -> Self {
        Self {
            ip: ip.into(),
            user_agent: user_agent.map(str::to_string),
            referrer: referrer.map(str::to_string),
        }
    }
}

/// An in-memory click event queued for the background worker.
///
/// Produced by a successful resolution and sent over a bounded channel so the
/// redirect never waits on the click write.
///
/// # Usage Flow
///
/// 1. Created by [`crate::application::services::LinkService::resolve`]
/// 2. Sent to the channel (non-blocking)
/// 3. Processed by [`crate::domain::click_worker::run_click_worker`]
/// 4. Converted to [`NewClick`] for persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub code: String,
    pub ip: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    /// When the code was resolved, not when the worker gets to it.
    pub occurred_at: DateTime<Utc>,
}

impl ClickEvent {
    pub fn new(code: impl Into<String>, context: ClickContext) -> Self {
        Self {
            code: code.into(),
            ip: context.ip,
            user_agent: context.user_agent,
            referrer: context.referrer,
            occurred_at: Utc::now(),
        }
    }

    /// Converts the event into a storable click stamped with its resolution time.
    ///
    /// No GeoIP lookup is performed; the location is recorded empty.
    pub fn into_new_click(self) -> NewClick {
        NewClick::new(self.code, self.ip, self.referrer, self.user_agent, None)
            .occurred_at(self.occurred_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::click::{DIRECT_REFERRER, UNKNOWN_USER_AGENT};

    #[test]
    fn test_click_event_creation_full() {
        let event = ClickEvent::new(
            "abc123",
            ClickContext::new("192.168.1.1", Some("Mozilla/5.0"), Some("https://google.com")),
        );

        assert_eq!(event.code, "abc123");
        assert_eq!(event.ip, "192.168.1.1");
        assert_eq!(event.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(event.referrer.as_deref(), Some("https://google.com"));
    }

    #[test]
    fn test_into_new_click_fills_placeholders() {
        let click = ClickEvent::new("xyz", ClickContext::new("10.0.0.1", None, None)).into_new_click();

        assert_eq!(click.short_code, "xyz");
        assert_eq!(click.ip_address, "10.0.0.1");
        assert_eq!(click.user_agent, UNKNOWN_USER_AGENT);
        assert_eq!(click.referrer, DIRECT_REFERRER);
        assert!(click.geo_location.is_empty());
    }

    #[test]
    fn test_event_keeps_resolution_time() {
        let event = ClickEvent::new("abc", ClickContext::default());
        let resolved_at = event.occurred_at;

        let click = event.into_new_click();
        assert_eq!(click.occurred_at, resolved_at);
    }
}
