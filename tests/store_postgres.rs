//! PostgreSQL store tests. Run with a database:
//!
//! ```bash
//! DATABASE_URL=postgres://... cargo test --test store_postgres -- --ignored
//! ```

use sqlx::PgPool;
use std::sync::Arc;

use snaplink::domain::repositories::{CellCondition, Columns, KeyValueStore, Mutation};
use snaplink::infrastructure::store::PgStore;

const TABLE: &str = "url_tracking";

fn row(value: &str) -> Columns {
    Columns::new().with_cell("url_info", "long_url", value)
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_put_if_absent_keeps_first_writer(pool: PgPool) {
    let store = PgStore::new(Arc::new(pool));

    assert!(store.put_if_absent(TABLE, "url#a", row("first")).await.unwrap());
    assert!(!store.put_if_absent(TABLE, "url#a", row("second")).await.unwrap());

    let stored = store.get(TABLE, "url#a").await.unwrap().unwrap();
    assert_eq!(stored.columns.cell("url_info", "long_url"), Some("first"));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_check_and_put(pool: PgPool) {
    let store = PgStore::new(Arc::new(pool));
    let columns = row("x").with_cell("url_info", "is_active", "true");
    store.put(TABLE, "url#once", columns).await.unwrap();

    let condition = CellCondition::new("url_info", "is_active", "true");
    let update = Columns::new().with_cell("url_info", "is_active", "false");

    assert!(store
        .check_and_put(TABLE, "url#once", condition.clone(), update.clone())
        .await
        .unwrap());
    assert!(!store
        .check_and_put(TABLE, "url#once", condition, update)
        .await
        .unwrap());

    let stored = store.get(TABLE, "url#once").await.unwrap().unwrap();
    assert_eq!(stored.columns.cell("url_info", "long_url"), Some("x"));
    assert_eq!(stored.columns.cell("url_info", "is_active"), Some("false"));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_scan_prefix_is_ordered_and_literal(pool: PgPool) {
    let store = PgStore::new(Arc::new(pool));
    for key in ["click#a#2", "click#a#1", "click#a_b#1", "click#ab#1", "url#a"] {
        store.put(TABLE, key, row(key)).await.unwrap();
    }

    let keys: Vec<String> = store
        .scan_prefix(TABLE, "click#a#")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.key)
        .collect();
    assert_eq!(keys, vec!["click#a#1", "click#a#2"]);

    let underscored = store.scan_prefix(TABLE, "click#a_").await.unwrap();
    assert_eq!(underscored.len(), 1);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_write_batch_is_atomic(pool: PgPool) {
    let store = PgStore::new(Arc::new(pool));
    store.put(TABLE, "url#old", row("old")).await.unwrap();
    store.put(TABLE, "url#taken", row("taken")).await.unwrap();

    let rejected = store
        .write_batch(
            TABLE,
            vec![
                Mutation::PutIfAbsent {
                    key: "url#taken".to_string(),
                    columns: row("old"),
                },
                Mutation::Delete {
                    key: "url#old".to_string(),
                },
            ],
        )
        .await
        .unwrap();
    assert!(!rejected);
    assert!(store.get(TABLE, "url#old").await.unwrap().is_some());

    let applied = store
        .write_batch(
            TABLE,
            vec![
                Mutation::PutIfAbsent {
                    key: "url#new".to_string(),
                    columns: row("old"),
                },
                Mutation::Delete {
                    key: "url#old".to_string(),
                },
            ],
        )
        .await
        .unwrap();
    assert!(applied);
    assert!(store.get(TABLE, "url#old").await.unwrap().is_none());
    assert!(store.get(TABLE, "url#new").await.unwrap().is_some());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_if_guards_rename(pool: PgPool) {
    let store = PgStore::new(Arc::new(pool));
    let consumed = row("x").with_cell("url_info", "is_active", "false");
    store.put(TABLE, "url#once", consumed).await.unwrap();

    let rename = vec![
        Mutation::PutIfAbsent {
            key: "url#again".to_string(),
            columns: row("x").with_cell("url_info", "is_active", "true"),
        },
        Mutation::DeleteIf {
            key: "url#once".to_string(),
            condition: CellCondition::new("url_info", "is_active", "true"),
        },
    ];

    assert!(!store.write_batch(TABLE, rename).await.unwrap());
    assert!(store.get(TABLE, "url#again").await.unwrap().is_none());
    assert!(store.get(TABLE, "url#once").await.unwrap().is_some());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_count_prefix(pool: PgPool) {
    let store = PgStore::new(Arc::new(pool));
    for key in ["click#a#1", "click#a#2", "click#a_b#1", "url#a"] {
        store.put(TABLE, key, row(key)).await.unwrap();
    }

    assert_eq!(store.count_prefix(TABLE, "click#a#").await.unwrap(), 2);
    assert_eq!(store.count_prefix(TABLE, "click#a_").await.unwrap(), 1);
    assert_eq!(store.count_prefix(TABLE, "nothing#").await.unwrap(), 0);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_health_check(pool: PgPool) {
    let store = PgStore::new(Arc::new(pool));
    store.health_check().await.unwrap();
    assert_eq!(store.backend_name(), "postgres");
}
