//! Click recording and aggregation service.

use std::sync::Arc;

use crate::domain::entities::{Click, LinkRecord, LinkSummary, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Service for appending click events and computing click counts.
///
/// Redirects record clicks asynchronously through the click worker; the
/// synchronous [`ClickService::record`] is used by callers that need the
/// stored event back.
pub struct ClickService<C: ClickRepository> {
    repository: Arc<C>,
}

impl<C: ClickRepository> ClickService<C> {
    pub fn new(repository: Arc<C>) -> Self {
        Self { repository }
    }

    /// Shared handle to the repository, for the click worker.
    pub fn repository(&self) -> Arc<C> {
        self.repository.clone()
    }

    /// Appends one click event keyed by `(code, now)`.
    ///
    /// Missing referrer and user agent are stored as `Direct` and `Unknown`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the write fails.
    pub async fn record(
        &self,
        code: &str,
        ip_address: &str,
        referrer: Option<String>,
        geo_location: Option<String>,
        user_agent: Option<String>,
    ) -> Result<Click, AppError> {
        let new_click = NewClick::new(code, ip_address, referrer, user_agent, geo_location);
        self.repository.record_click(new_click).await
    }

    /// Number of clicks ever recorded for `code`.
    pub async fn count_for(&self, code: &str) -> Result<u64, AppError> {
        self.repository.count_for(code).await
    }

    /// Every click recorded for `code`, oldest first.
    ///
    /// Unknown codes yield an empty list.
    pub async fn details_for(&self, code: &str) -> Result<Vec<Click>, AppError> {
        self.repository.clicks_for(code).await
    }

    /// Joins each record with its click count, preserving input order.
    pub async fn with_counts(&self, records: Vec<LinkRecord>) -> Result<Vec<LinkSummary>, AppError> {
        let mut summaries = Vec::with_capacity(records.len());
        for record in records {
            let click_count = self.repository.count_for(&record.short_code).await?;
            summaries.push(LinkSummary {
                short_code: record.short_code,
                long_url: record.long_url,
                click_count,
            });
        }
        Ok(summaries)
    }

    /// Removes all clicks of `code`. Returns the number removed.
    pub async fn delete_for(&self, code: &str) -> Result<usize, AppError> {
        self.repository.delete_for(code).await
    }

    /// Clicks recorded across all codes.
    pub async fn total_clicks(&self) -> Result<u64, AppError> {
        self.repository.count_all().await
    }
}
