//! Process-local key-value store.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::domain::repositories::{
    CellCondition, Columns, KeyValueStore, Mutation, Row, StoreResult,
};

type Table = BTreeMap<String, Columns>;

/// In-memory [`KeyValueStore`] used by tests and local development.
///
/// Tables are ordered maps, so prefix scans come back in key order like the
/// PostgreSQL backend. Every operation holds the lock for its whole
/// duration, which makes conditional writes and batches atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_rows<'a>(iter: impl Iterator<Item = (&'a String, &'a Columns)>) -> Vec<Row> {
    iter.map(|(key, columns)| Row {
        key: key.clone(),
        columns: columns.clone(),
    })
    .collect()
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, table: &str, key: &str) -> StoreResult<Option<Row>> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|t| t.get(key)).map(|columns| Row {
            key: key.to_string(),
            columns: columns.clone(),
        }))
    }

    async fn put(&self, table: &str, key: &str, columns: Columns) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), columns);
        Ok(())
    }

    async fn put_if_absent(&self, table: &str, key: &str, columns: Columns) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.contains_key(key) {
            return Ok(false);
        }
        rows.insert(key.to_string(), columns);
        Ok(true)
    }

    async fn check_and_put(
        &self,
        table: &str,
        key: &str,
        condition: CellCondition,
        columns: Columns,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.get_mut(table).and_then(|t| t.get_mut(key)) {
            Some(existing) if condition.matches(existing) => {
                existing.merge(columns);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, table: &str, key: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(table)
            .and_then(|t| t.remove(key))
            .is_some())
    }

    async fn scan_prefix(&self, table: &str, prefix: &str) -> StoreResult<Vec<Row>> {
        let tables = self.tables.read().await;
        let Some(rows) = tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(to_rows(
            rows.range(prefix.to_string()..)
                .take_while(|(key, _)| key.starts_with(prefix)),
        ))
    }

    async fn scan_all(&self, table: &str) -> StoreResult<Vec<Row>> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).map(|t| to_rows(t.iter())).unwrap_or_default())
    }

    async fn count_prefix(&self, table: &str, prefix: &str) -> StoreResult<u64> {
        let tables = self.tables.read().await;
        let Some(rows) = tables.get(table) else {
            return Ok(0);
        };
        let count = rows
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .count();
        Ok(count as u64)
    }

    async fn write_batch(&self, table: &str, mutations: Vec<Mutation>) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();

        let blocked = mutations.iter().any(|m| match m {
            Mutation::PutIfAbsent { key, .. } => rows.contains_key(key),
            Mutation::DeleteIf { key, condition } => {
                !rows.get(key).is_some_and(|existing| condition.matches(existing))
            }
            _ => false,
        });
        if blocked {
            return Ok(false);
        }

        for mutation in mutations {
            match mutation {
                Mutation::Put { key, columns } | Mutation::PutIfAbsent { key, columns } => {
                    rows.insert(key, columns);
                }
                Mutation::Delete { key } | Mutation::DeleteIf { key, .. } => {
                    rows.remove(&key);
                }
            }
        }
        Ok(true)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
