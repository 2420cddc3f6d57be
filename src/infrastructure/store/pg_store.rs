//! PostgreSQL key-value store over the `kv_rows` table.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use std::sync::Arc;

use crate::domain::repositories::{
    CellCondition, Columns, KeyValueStore, Mutation, Row, StoreError, StoreResult,
};

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// [`KeyValueStore`] persisting each row as one JSONB document.
///
/// Row keys use the `C` collation so `ORDER BY row_key` matches byte order.
/// Conditional writes rely on the primary key; batches run in a transaction.
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await
    }
}

/// Escapes `LIKE` wildcards so the prefix matches literally.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn to_row((key, columns): (String, Json<Columns>)) -> Row {
    Row {
        key,
        columns: columns.0,
    }
}

async fn insert_if_absent<'e>(
    executor: impl PgExecutor<'e>,
    table: &str,
    key: &str,
    columns: Columns,
) -> StoreResult<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO kv_rows (table_name, row_key, columns)
        VALUES ($1, $2, $3)
        ON CONFLICT (table_name, row_key) DO NOTHING
        "#,
    )
    .bind(table)
    .bind(key)
    .bind(Json(columns))
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Locks the row for the rest of the transaction and returns its cells.
async fn lock_row<'e>(
    executor: impl PgExecutor<'e>,
    table: &str,
    key: &str,
) -> StoreResult<Option<Columns>> {
    let current: Option<(Json<Columns>,)> = sqlx::query_as(
        "SELECT columns FROM kv_rows WHERE table_name = $1 AND row_key = $2 FOR UPDATE",
    )
    .bind(table)
    .bind(key)
    .fetch_optional(executor)
    .await?;

    Ok(current.map(|(columns,)| columns.0))
}

#[async_trait]
impl KeyValueStore for PgStore {
    async fn get(&self, table: &str, key: &str) -> StoreResult<Option<Row>> {
        let row: Option<(String, Json<Columns>)> = sqlx::query_as(
            "SELECT row_key, columns FROM kv_rows WHERE table_name = $1 AND row_key = $2",
        )
        .bind(table)
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(to_row))
    }

    async fn put(&self, table: &str, key: &str, columns: Columns) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_rows (table_name, row_key, columns)
            VALUES ($1, $2, $3)
            ON CONFLICT (table_name, row_key)
            DO UPDATE SET columns = EXCLUDED.columns, updated_at = NOW()
            "#,
        )
        .bind(table)
        .bind(key)
        .bind(Json(columns))
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn put_if_absent(&self, table: &str, key: &str, columns: Columns) -> StoreResult<bool> {
        insert_if_absent(self.pool.as_ref(), table, key, columns).await
    }

    async fn check_and_put(
        &self,
        table: &str,
        key: &str,
        condition: CellCondition,
        columns: Columns,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let Some(mut existing) = lock_row(&mut *tx, table, key).await? else {
            tx.rollback().await?;
            return Ok(false);
        };

        if !condition.matches(&existing) {
            tx.rollback().await?;
            return Ok(false);
        }

        existing.merge(columns);

        sqlx::query(
            r#"
            UPDATE kv_rows SET columns = $3, updated_at = NOW()
            WHERE table_name = $1 AND row_key = $2
            "#,
        )
        .bind(table)
        .bind(key)
        .bind(Json(existing))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, table: &str, key: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM kv_rows WHERE table_name = $1 AND row_key = $2")
            .bind(table)
            .bind(key)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn scan_prefix(&self, table: &str, prefix: &str) -> StoreResult<Vec<Row>> {
        let rows: Vec<(String, Json<Columns>)> = sqlx::query_as(
            r#"
            SELECT row_key, columns FROM kv_rows
            WHERE table_name = $1 AND row_key LIKE $2 ESCAPE '\'
            ORDER BY row_key
            "#,
        )
        .bind(table)
        .bind(like_prefix(prefix))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(to_row).collect())
    }

    async fn scan_all(&self, table: &str) -> StoreResult<Vec<Row>> {
        let rows: Vec<(String, Json<Columns>)> = sqlx::query_as(
            "SELECT row_key, columns FROM kv_rows WHERE table_name = $1 ORDER BY row_key",
        )
        .bind(table)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(to_row).collect())
    }

    async fn count_prefix(&self, table: &str, prefix: &str) -> StoreResult<u64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM kv_rows
            WHERE table_name = $1 AND row_key LIKE $2 ESCAPE '\'
            "#,
        )
        .bind(table)
        .bind(like_prefix(prefix))
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn write_batch(&self, table: &str, mutations: Vec<Mutation>) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        for mutation in mutations {
            match mutation {
                Mutation::Put { key, columns } => {
                    sqlx::query(
                        r#"
                        INSERT INTO kv_rows (table_name, row_key, columns)
                        VALUES ($1, $2, $3)
                        ON CONFLICT (table_name, row_key)
                        DO UPDATE SET columns = EXCLUDED.columns, updated_at = NOW()
                        "#,
                    )
                    .bind(table)
                    .bind(&key)
                    .bind(Json(columns))
                    .execute(&mut *tx)
                    .await?;
                }
                Mutation::PutIfAbsent { key, columns } => {
                    if !insert_if_absent(&mut *tx, table, &key, columns).await? {
                        tx.rollback().await?;
                        return Ok(false);
                    }
                }
                Mutation::Delete { key } => {
                    sqlx::query("DELETE FROM kv_rows WHERE table_name = $1 AND row_key = $2")
                        .bind(table)
                        .bind(&key)
                        .execute(&mut *tx)
                        .await?;
                }
                Mutation::DeleteIf { key, condition } => {
                    let current = lock_row(&mut *tx, table, &key).await?;
                    if !current.is_some_and(|existing| condition.matches(&existing)) {
                        tx.rollback().await?;
                        return Ok(false);
                    }
                    sqlx::query("DELETE FROM kv_rows WHERE table_name = $1 AND row_key = $2")
                        .bind(table)
                        .bind(&key)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
