//! Request-level timeout decorator for any key-value store.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::domain::repositories::{
    CellCondition, Columns, KeyValueStore, Mutation, Row, StoreError, StoreResult,
};

/// Wraps a store so that no single call outlives `timeout`.
///
/// An elapsed deadline surfaces as [`StoreError::Timeout`]. The wrapped call
/// is dropped at that point; an in-flight PostgreSQL transaction rolls back.
pub struct TimedStore {
    inner: Arc<dyn KeyValueStore>,
    timeout: Duration,
}

impl TimedStore {
    pub fn new(inner: Arc<dyn KeyValueStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    backend = self.inner.backend_name(),
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for TimedStore {
    async fn get(&self, table: &str, key: &str) -> StoreResult<Option<Row>> {
        self.bounded("get", self.inner.get(table, key)).await
    }

    async fn put(&self, table: &str, key: &str, columns: Columns) -> StoreResult<()> {
        self.bounded("put", self.inner.put(table, key, columns)).await
    }

    async fn put_if_absent(&self, table: &str, key: &str, columns: Columns) -> StoreResult<bool> {
        self.bounded("put_if_absent", self.inner.put_if_absent(table, key, columns))
            .await
    }

    async fn check_and_put(
        &self,
        table: &str,
        key: &str,
        condition: CellCondition,
        columns: Columns,
    ) -> StoreResult<bool> {
        self.bounded(
            "check_and_put",
            self.inner.check_and_put(table, key, condition, columns),
        )
        .await
    }

    async fn delete(&self, table: &str, key: &str) -> StoreResult<bool> {
        self.bounded("delete", self.inner.delete(table, key)).await
    }

    async fn scan_prefix(&self, table: &str, prefix: &str) -> StoreResult<Vec<Row>> {
        self.bounded("scan_prefix", self.inner.scan_prefix(table, prefix))
            .await
    }

    async fn scan_all(&self, table: &str) -> StoreResult<Vec<Row>> {
        self.bounded("scan_all", self.inner.scan_all(table)).await
    }

    async fn count_prefix(&self, table: &str, prefix: &str) -> StoreResult<u64> {
        self.bounded("count_prefix", self.inner.count_prefix(table, prefix))
            .await
    }

    async fn write_batch(&self, table: &str, mutations: Vec<Mutation>) -> StoreResult<bool> {
        self.bounded("write_batch", self.inner.write_batch(table, mutations))
            .await
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.bounded("health_check", self.inner.health_check()).await
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
