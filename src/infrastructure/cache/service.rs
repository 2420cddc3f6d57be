//! Cache service trait and error types.

use async_trait::async_trait;

use crate::domain::entities::LinkRecord;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching link records by short code.
///
/// Implementations must be thread-safe and handle errors gracefully without
/// disrupting the application (cache failures degrade to store lookups).
/// Callers evaluate expiration and the active flag on the cached copy, so a
/// cached record is never trusted beyond what the store would have returned.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached record for a short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<LinkRecord>>;

    /// Stores a record with optional TTL in seconds.
    ///
    /// Implementations fall back to their default TTL when `ttl_seconds` is `None`.
    /// Returns whether the record was actually stored.
    async fn set_link(&self, record: &LinkRecord, ttl_seconds: Option<u64>) -> CacheResult<bool>;

    /// Removes a cached record.
    ///
    /// Used when a link is deleted, renamed or consumed.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name for health output.
    fn backend_name(&self) -> &'static str;
}
