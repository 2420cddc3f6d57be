//! Repository trait for click events.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the append-only click log.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::KvClickRepository`] - key-value store implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click event stamped with its `occurred_at` time.
    ///
    /// Idempotent per click: retrying the same [`NewClick`] after an
    /// ambiguous failure never stores it twice.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on store errors.
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Counts click events recorded for `code`.
    async fn count_for(&self, code: &str) -> Result<u64, AppError>;

    /// Lists click events for `code`, oldest first.
    async fn clicks_for(&self, code: &str) -> Result<Vec<Click>, AppError>;

    /// Removes every click event for `code`. Returns the number removed.
    async fn delete_for(&self, code: &str) -> Result<usize, AppError>;

    /// Counts click events across all codes.
    async fn count_all(&self) -> Result<u64, AppError>;
}
