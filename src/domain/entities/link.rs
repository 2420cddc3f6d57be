//! Link record entity and its expiration rules.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::url_normalizer::normalize_destination;

/// Owner whose links live for 24 hours after creation, whatever their stored expiration.
///
/// Kept for compatibility with links minted before expirations were configurable.
pub const LEGACY_OWNER_ID: &str = "user123";

/// Lifetime granted to links of [`LEGACY_OWNER_ID`].
pub const LEGACY_LINK_LIFETIME_HOURS: i64 = 24;

/// Expiration applied when the creator supplies none.
pub fn default_expiration() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|n| n.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Resolution state of a link at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Active,
    Inactive,
    Expired,
}

/// A short link mapping a code to its destination.
///
/// `short_code` is the sole uniqueness key; `custom_alias` mirrors it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub short_code: String,
    pub long_url: String,
    pub owner_id: String,
    pub creation_timestamp: DateTime<Utc>,
    pub expiration_timestamp: DateTime<Utc>,
    pub one_time_use: bool,
    pub active: bool,
    pub custom_alias: Option<String>,
}

impl LinkRecord {
    /// Returns true for links owned by the legacy 24-hour account.
    pub fn is_legacy_owner(&self) -> bool {
        self.owner_id.eq_ignore_ascii_case(LEGACY_OWNER_ID)
    }

    /// Expiration actually enforced at resolution time.
    pub fn effective_expiration(&self) -> DateTime<Utc> {
        if self.is_legacy_owner() {
            self.creation_timestamp + Duration::hours(LEGACY_LINK_LIFETIME_HOURS)
        } else {
            self.expiration_timestamp
        }
    }

    /// Returns true if `now` is strictly after the effective expiration.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.effective_expiration()
    }

    /// Evaluates whether the link may be resolved at `now`.
    ///
    /// An inactive link reports [`LinkStatus::Inactive`] even when it is also expired.
    pub fn status_at(&self, now: DateTime<Utc>) -> LinkStatus {
        if !self.active {
            LinkStatus::Inactive
        } else if self.is_expired_at(now) {
            LinkStatus::Expired
        } else {
            LinkStatus::Active
        }
    }

    /// Redirect target with an `https://` scheme added when missing.
    pub fn destination(&self) -> String {
        normalize_destination(&self.long_url)
    }

    /// Copy of this record under a new code; every other field is preserved.
    pub fn renamed(&self, new_code: &str) -> Self {
        Self {
            short_code: new_code.to_string(),
            custom_alias: Some(new_code.to_string()),
            ..self.clone()
        }
    }
}

/// Input data for creating a new link.
///
/// The creation timestamp is stamped by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub code: String,
    pub long_url: String,
    pub owner_id: String,
    pub one_time_use: bool,
    pub expiration_timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(owner: &str, created: DateTime<Utc>, expires: DateTime<Utc>) -> LinkRecord {
        LinkRecord {
            short_code: "abc123".to_string(),
            long_url: "example.com/a".to_string(),
            owner_id: owner.to_string(),
            creation_timestamp: created,
            expiration_timestamp: expires,
            one_time_use: false,
            active: true,
            custom_alias: Some("abc123".to_string()),
        }
    }

    #[test]
    fn test_default_expiration_is_far_future() {
        let expiration = default_expiration();
        assert_eq!(expiration.to_rfc3339(), "9999-12-31T23:59:59+00:00");
    }

    #[test]
    fn test_active_link_before_expiration() {
        let now = Utc::now();
        let link = record("u1", now, now + Duration::days(1));
        assert_eq!(link.status_at(now), LinkStatus::Active);
    }

    #[test]
    fn test_expired_link() {
        let now = Utc::now();
        let link = record("u1", now - Duration::days(2), now - Duration::seconds(1));
        assert!(link.is_expired_at(now));
        assert_eq!(link.status_at(now), LinkStatus::Expired);
    }

    #[test]
    fn test_expiration_boundary_is_exclusive() {
        let now = Utc::now();
        let link = record("u1", now - Duration::days(1), now);
        assert!(!link.is_expired_at(now));
    }

    #[test]
    fn test_inactive_wins_over_expiration() {
        let now = Utc::now();
        let mut link = record("u1", now - Duration::days(2), now - Duration::days(1));
        link.active = false;
        assert_eq!(link.status_at(now), LinkStatus::Inactive);
    }

    #[test]
    fn test_legacy_owner_uses_24_hour_window() {
        let now = Utc::now();
        let link = record("user123", now - Duration::hours(25), default_expiration());
        assert_eq!(link.effective_expiration(), link.creation_timestamp + Duration::hours(24));
        assert_eq!(link.status_at(now), LinkStatus::Expired);
    }

    #[test]
    fn test_legacy_owner_ignores_past_expiration_inside_window() {
        let now = Utc::now();
        let link = record("USER123", now - Duration::hours(1), now - Duration::days(30));
        assert!(link.is_legacy_owner());
        assert_eq!(link.status_at(now), LinkStatus::Active);
    }

    #[test]
    fn test_destination_prepends_https() {
        let now = Utc::now();
        let link = record("u1", now, default_expiration());
        assert_eq!(link.destination(), "https://example.com/a");
    }

    #[test]
    fn test_renamed_preserves_fields() {
        let now = Utc::now();
        let link = record("u1", now, default_expiration());
        let renamed = link.renamed("promo");

        assert_eq!(renamed.short_code, "promo");
        assert_eq!(renamed.custom_alias.as_deref(), Some("promo"));
        assert_eq!(renamed.long_url, link.long_url);
        assert_eq!(renamed.owner_id, link.owner_id);
        assert_eq!(renamed.creation_timestamp, link.creation_timestamp);
        assert_eq!(renamed.expiration_timestamp, link.expiration_timestamp);
    }
}
