//! Repository implementations over the key-value store.
//!
//! Both repositories share one table. Link rows are keyed `url#<code>`; click
//! rows are keyed `click#<code>#<timestamp>` so a prefix scan yields one
//! link's clicks in chronological order.
//!
//! # Repositories
//!
//! - [`KvLinkRepository`] - Link records
//! - [`KvClickRepository`] - Click log

pub mod kv_click_repository;
pub mod kv_link_repository;

pub use kv_click_repository::KvClickRepository;
pub use kv_link_repository::KvLinkRepository;

use chrono::{DateTime, Utc};

use crate::domain::repositories::{Row, StoreError};

/// Table holding link and click rows.
pub const TRACKING_TABLE: &str = "url_tracking";

fn required_cell<'a>(row: &'a Row, family: &str, qualifier: &str) -> Result<&'a str, StoreError> {
    row.columns
        .cell(family, qualifier)
        .ok_or_else(|| StoreError::Corrupt {
            key: row.key.clone(),
            reason: format!("missing {}:{}", family, qualifier),
        })
}

fn parse_timestamp(row: &Row, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            key: row.key.clone(),
            reason: format!("bad timestamp {:?}: {}", value, e),
        })
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
