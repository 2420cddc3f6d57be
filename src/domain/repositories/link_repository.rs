//! Repository trait for link record data access.

use crate::domain::entities::{LinkRecord, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing link records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::KvLinkRepository`] - key-value store implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link record with a conditional write.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code already exists. The existing
    /// record is left untouched.
    ///
    /// Returns [`AppError::StoreUnavailable`] on store errors.
    async fn create(&self, new_link: NewLink) -> Result<LinkRecord, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(LinkRecord))` if found, active or not
    /// - `Ok(None)` if not found
    async fn find_by_code(&self, code: &str) -> Result<Option<LinkRecord>, AppError>;

    /// Returns whether a record exists under `code`.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Deletes a link. Returns `Ok(false)` if there was nothing to delete.
    async fn delete(&self, code: &str) -> Result<bool, AppError>;

    /// Moves `record` to `new_code` in one atomic batch.
    ///
    /// The move only applies while the stored row still has the active flag
    /// of `record`; nothing is written otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if `new_code` is taken or the link
    /// changed since `record` was read, and [`AppError::NotFound`] if it was
    /// deleted.
    async fn rename(&self, record: &LinkRecord, new_code: &str) -> Result<LinkRecord, AppError>;

    /// Flips an active record to inactive.
    ///
    /// Returns `Ok(true)` only for the caller whose write performed the flip.
    async fn deactivate(&self, code: &str) -> Result<bool, AppError>;

    /// Case-insensitive substring search over code, alias and long URL.
    async fn search(&self, query: &str) -> Result<Vec<LinkRecord>, AppError>;

    /// Lists every link of one owner.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<LinkRecord>, AppError>;

    /// Counts all link records.
    async fn count(&self) -> Result<u64, AppError>;
}
