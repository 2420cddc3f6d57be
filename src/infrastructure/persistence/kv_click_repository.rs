//! Key-value store implementation of the click repository.

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use super::{TRACKING_TABLE, parse_timestamp, required_cell};
use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::{
    ClickRepository, Columns, KeyValueStore, Mutation, Row, StoreError,
};
use crate::error::AppError;

const CLICK_KEY_PREFIX: &str = "click#";
const CLICK_INFO: &str = "click_info";

/// Attempts at finding a free timestamp slot for one click.
const MAX_SLOT_ATTEMPTS: u32 = 16;

/// Fixed-width nanosecond timestamp; lexicographic order is chronological.
fn format_click_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Scan prefix covering every click of `code`.
pub fn click_prefix(code: &str) -> String {
    format!("{}{}#", CLICK_KEY_PREFIX, code)
}

fn click_row_key(code: &str, ts: DateTime<Utc>) -> String {
    format!("{}{}", click_prefix(code), format_click_timestamp(ts))
}

fn encode_click(click: &NewClick, ts: DateTime<Utc>) -> Columns {
    Columns::new()
        .with_cell(CLICK_INFO, "timestamp", format_click_timestamp(ts))
        .with_cell(CLICK_INFO, "ip_address", click.ip_address.as_str())
        .with_cell(CLICK_INFO, "referrer", click.referrer.as_str())
        .with_cell(CLICK_INFO, "user_agent", click.user_agent.as_str())
        .with_cell(CLICK_INFO, "geo_location", click.geo_location.as_str())
        .with_cell(CLICK_INFO, "event_id", click.event_id.as_str())
}

fn decode_click(row: &Row) -> Result<Click, StoreError> {
    let short_code = row
        .key
        .strip_prefix(CLICK_KEY_PREFIX)
        .and_then(|rest| rest.rsplit_once('#'))
        .map(|(code, _)| code)
        .ok_or_else(|| StoreError::Corrupt {
            key: row.key.clone(),
            reason: "not a click row".to_string(),
        })?;
    let cell = |q: &str| row.columns.cell(CLICK_INFO, q).unwrap_or_default().to_string();

    Ok(Click {
        short_code: short_code.to_string(),
        timestamp: parse_timestamp(row, required_cell(row, CLICK_INFO, "timestamp")?)?,
        ip_address: cell("ip_address"),
        referrer: cell("referrer"),
        user_agent: cell("user_agent"),
        geo_location: cell("geo_location"),
    })
}

/// [`ClickRepository`] over the `click#<code>#<timestamp>` rows of the tracking table.
pub struct KvClickRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvClickRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ClickRepository for KvClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let mut ts = new_click.occurred_at;

        for _ in 0..MAX_SLOT_ATTEMPTS {
            let key = click_row_key(&new_click.short_code, ts);
            let columns = encode_click(&new_click, ts);

            let written = self
                .store
                .put_if_absent(TRACKING_TABLE, &key, columns.clone())
                .await?;

            // A slot holding exactly our cells is an earlier attempt of this
            // same click that committed before its caller saw a failure.
            let already_stored = !written
                && self
                    .store
                    .get(TRACKING_TABLE, &key)
                    .await?
                    .is_some_and(|row| row.columns == columns);

            if written || already_stored {
                if already_stored {
                    debug!(code = %new_click.short_code, key = %key, "Click already stored");
                }
                return Ok(Click {
                    short_code: new_click.short_code,
                    timestamp: ts,
                    ip_address: new_click.ip_address,
                    referrer: new_click.referrer,
                    user_agent: new_click.user_agent,
                    geo_location: new_click.geo_location,
                });
            }
            ts += Duration::nanoseconds(1);
        }

        Err(AppError::internal(
            "No free click timestamp slot",
            json!({ "code": new_click.short_code }),
        ))
    }

    async fn count_for(&self, code: &str) -> Result<u64, AppError> {
        Ok(self
            .store
            .count_prefix(TRACKING_TABLE, &click_prefix(code))
            .await?)
    }

    async fn clicks_for(&self, code: &str) -> Result<Vec<Click>, AppError> {
        let rows = self
            .store
            .scan_prefix(TRACKING_TABLE, &click_prefix(code))
            .await?;
        rows.iter()
            .map(|row| decode_click(row).map_err(AppError::from))
            .collect()
    }

    async fn delete_for(&self, code: &str) -> Result<usize, AppError> {
        let rows = self
            .store
            .scan_prefix(TRACKING_TABLE, &click_prefix(code))
            .await?;
        let removed = rows.len();
        if removed == 0 {
            return Ok(0);
        }

        let mutations = rows
            .into_iter()
            .map(|row| Mutation::Delete { key: row.key })
            .collect();
        self.store.write_batch(TRACKING_TABLE, mutations).await?;
        Ok(removed)
    }

    async fn count_all(&self) -> Result<u64, AppError> {
        Ok(self
            .store
            .count_prefix(TRACKING_TABLE, CLICK_KEY_PREFIX)
            .await?)
    }
}
