//! Generic key-value store contract.
//!
//! Rows are addressed by `(table, row key)` and hold cells grouped into
//! column families, the way wide-column stores lay them out. Row keys are
//! compared byte-wise, so a prefix scan returns rows in lexicographic order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Cells of one column family, keyed by qualifier.
pub type ColumnFamily = BTreeMap<String, String>;

/// All cells of a row, grouped by column family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Columns(BTreeMap<String, ColumnFamily>);

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Columns::set_cell`].
    pub fn with_cell(
        mut self,
        family: impl Into<String>,
        qualifier: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set_cell(family, qualifier, value);
        self
    }

    pub fn set_cell(
        &mut self,
        family: impl Into<String>,
        qualifier: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.0
            .entry(family.into())
            .or_default()
            .insert(qualifier.into(), value.into());
    }

    pub fn cell(&self, family: &str, qualifier: &str) -> Option<&str> {
        self.0
            .get(family)
            .and_then(|f| f.get(qualifier))
            .map(String::as_str)
    }

    /// Overwrites cells of `self` with every cell present in `other`.
    pub fn merge(&mut self, other: Columns) {
        for (family, cells) in other.0 {
            self.0.entry(family).or_default().extend(cells);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }
}

/// A stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub key: String,
    pub columns: Columns,
}

/// Precondition for [`KeyValueStore::check_and_put`]: the cell must hold `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellCondition {
    pub family: String,
    pub qualifier: String,
    pub expected: String,
}

impl CellCondition {
    pub fn new(
        family: impl Into<String>,
        qualifier: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
            expected: expected.into(),
        }
    }

    pub fn matches(&self, columns: &Columns) -> bool {
        columns.cell(&self.family, &self.qualifier) == Some(self.expected.as_str())
    }
}

/// One step of an atomic [`KeyValueStore::write_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Replaces the whole row.
    Put { key: String, columns: Columns },
    /// Writes the row only if the key is free; otherwise the batch is rejected.
    PutIfAbsent { key: String, columns: Columns },
    /// Removes the row if present.
    Delete { key: String },
    /// Removes the row; the batch is rejected if the row is missing or
    /// `condition` does not hold.
    DeleteIf { key: String, condition: CellCondition },
}

/// Failures of the backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("corrupt row {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable mapping from row key to column families.
///
/// # Implementations
///
/// - [`crate::infrastructure::store::MemoryStore`] - process-local, for tests and development
/// - [`crate::infrastructure::store::PgStore`] - PostgreSQL `kv_rows` table
/// - [`crate::infrastructure::store::TimedStore`] - request-level timeout around another store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads one row.
    async fn get(&self, table: &str, key: &str) -> StoreResult<Option<Row>>;

    /// Writes one row, replacing any previous content.
    async fn put(&self, table: &str, key: &str, columns: Columns) -> StoreResult<()>;

    /// Writes one row only if the key does not exist yet.
    ///
    /// Returns `Ok(false)` without touching the existing row when the key is taken.
    async fn put_if_absent(&self, table: &str, key: &str, columns: Columns) -> StoreResult<bool>;

    /// Merges `columns` into an existing row if `condition` holds.
    ///
    /// Returns `Ok(false)` when the row is missing or the condition fails.
    async fn check_and_put(
        &self,
        table: &str,
        key: &str,
        condition: CellCondition,
        columns: Columns,
    ) -> StoreResult<bool>;

    /// Deletes one row. Returns whether a row was removed.
    async fn delete(&self, table: &str, key: &str) -> StoreResult<bool>;

    /// Returns every row whose key starts with `prefix`, in key order.
    async fn scan_prefix(&self, table: &str, prefix: &str) -> StoreResult<Vec<Row>>;

    /// Returns every row of the table, in key order.
    async fn scan_all(&self, table: &str) -> StoreResult<Vec<Row>>;

    /// Counts rows whose key starts with `prefix` without loading them.
    async fn count_prefix(&self, table: &str, prefix: &str) -> StoreResult<u64>;

    /// Applies all mutations atomically.
    ///
    /// Returns `Ok(false)` and applies nothing if a [`Mutation::PutIfAbsent`]
    /// targets an existing key or a [`Mutation::DeleteIf`] precondition fails.
    async fn write_batch(&self, table: &str, mutations: Vec<Mutation>) -> StoreResult<bool>;

    /// Verifies the backend is reachable.
    async fn health_check(&self) -> StoreResult<()>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_cells() {
        let columns = Columns::new()
            .with_cell("url_info", "long_url", "example.com")
            .with_cell("user_info", "user_id", "u1");

        assert_eq!(columns.cell("url_info", "long_url"), Some("example.com"));
        assert_eq!(columns.cell("user_info", "user_id"), Some("u1"));
        assert_eq!(columns.cell("url_info", "missing"), None);
        assert!(!columns.is_empty());
        assert!(Columns::new().is_empty());
    }

    #[test]
    fn test_columns_merge_overwrites_cells() {
        let mut columns = Columns::new()
            .with_cell("url_info", "is_active", "true")
            .with_cell("url_info", "long_url", "example.com");

        columns.merge(Columns::new().with_cell("url_info", "is_active", "false"));

        assert_eq!(columns.cell("url_info", "is_active"), Some("false"));
        assert_eq!(columns.cell("url_info", "long_url"), Some("example.com"));
    }

    #[test]
    fn test_cell_condition() {
        let columns = Columns::new().with_cell("url_info", "is_active", "true");

        assert!(CellCondition::new("url_info", "is_active", "true").matches(&columns));
        assert!(!CellCondition::new("url_info", "is_active", "false").matches(&columns));
        assert!(!CellCondition::new("url_info", "other", "true").matches(&columns));
    }

    #[test]
    fn test_columns_serialize_as_nested_map() {
        let columns = Columns::new().with_cell("url_info", "long_url", "example.com");
        let json = serde_json::to_value(&columns).unwrap();
        assert_eq!(json["url_info"]["long_url"], "example.com");
    }
}
