//! Key-value store implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

use super::{TRACKING_TABLE, parse_bool, parse_timestamp, required_cell};
use crate::domain::entities::{LinkRecord, NewLink};
use crate::domain::repositories::{
    CellCondition, Columns, KeyValueStore, LinkRepository, Mutation, Row, StoreError,
};
use crate::error::AppError;

const LINK_KEY_PREFIX: &str = "url#";
const URL_INFO: &str = "url_info";
const USER_INFO: &str = "user_info";

/// Row key of the link stored under `code`.
pub fn link_row_key(code: &str) -> String {
    format!("{}{}", LINK_KEY_PREFIX, code)
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Encodes a record into its `url_info` / `user_info` cells.
pub fn encode_link(record: &LinkRecord) -> Columns {
    let mut columns = Columns::new()
        .with_cell(URL_INFO, "long_url", record.long_url.as_str())
        .with_cell(
            URL_INFO,
            "creation_date",
            format_timestamp(record.creation_timestamp),
        )
        .with_cell(
            URL_INFO,
            "expiration_date",
            format_timestamp(record.expiration_timestamp),
        )
        .with_cell(URL_INFO, "one_time", record.one_time_use.to_string())
        .with_cell(URL_INFO, "is_active", record.active.to_string())
        .with_cell(USER_INFO, "user_id", record.owner_id.as_str());

    if let Some(alias) = &record.custom_alias {
        columns.set_cell(URL_INFO, "custom_alias", alias.as_str());
    }
    columns
}

/// Decodes a link row. Fails with [`StoreError::Corrupt`] on missing or malformed cells.
pub fn decode_link(row: &Row) -> Result<LinkRecord, StoreError> {
    let short_code = row
        .key
        .strip_prefix(LINK_KEY_PREFIX)
        .ok_or_else(|| StoreError::Corrupt {
            key: row.key.clone(),
            reason: "not a link row".to_string(),
        })?;
    let c = &row.columns;

    Ok(LinkRecord {
        short_code: short_code.to_string(),
        long_url: required_cell(row, URL_INFO, "long_url")?.to_string(),
        owner_id: required_cell(row, USER_INFO, "user_id")?.to_string(),
        creation_timestamp: parse_timestamp(row, required_cell(row, URL_INFO, "creation_date")?)?,
        expiration_timestamp: parse_timestamp(
            row,
            required_cell(row, URL_INFO, "expiration_date")?,
        )?,
        one_time_use: c.cell(URL_INFO, "one_time").is_some_and(parse_bool),
        active: c.cell(URL_INFO, "is_active").is_none_or(parse_bool),
        custom_alias: c
            .cell(URL_INFO, "custom_alias")
            .filter(|a| !a.is_empty())
            .map(str::to_string),
    })
}

fn matches_query(record: &LinkRecord, needle: &str) -> bool {
    record.short_code.to_lowercase().contains(needle)
        || record.long_url.to_lowercase().contains(needle)
        || record
            .custom_alias
            .as_deref()
            .is_some_and(|a| a.to_lowercase().contains(needle))
}

fn newest_first(records: &mut [LinkRecord]) {
    records.sort_by(|a, b| {
        b.creation_timestamp
            .cmp(&a.creation_timestamp)
            .then_with(|| a.short_code.cmp(&b.short_code))
    });
}

/// [`LinkRepository`] over the `url#<code>` rows of the tracking table.
pub struct KvLinkRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvLinkRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn all_links(&self) -> Result<Vec<LinkRecord>, AppError> {
        let rows = self.store.scan_prefix(TRACKING_TABLE, LINK_KEY_PREFIX).await?;
        rows.iter()
            .map(|row| decode_link(row).map_err(AppError::from))
            .collect()
    }
}

#[async_trait]
impl LinkRepository for KvLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<LinkRecord, AppError> {
        let record = LinkRecord {
            custom_alias: Some(new_link.code.clone()),
            short_code: new_link.code,
            long_url: new_link.long_url,
            owner_id: new_link.owner_id,
            creation_timestamp: Utc::now(),
            expiration_timestamp: new_link.expiration_timestamp,
            one_time_use: new_link.one_time_use,
            active: true,
        };

        let written = self
            .store
            .put_if_absent(
                TRACKING_TABLE,
                &link_row_key(&record.short_code),
                encode_link(&record),
            )
            .await?;

        if !written {
            return Err(AppError::conflict(
                "Short code already exists",
                json!({ "code": record.short_code }),
            ));
        }

        Ok(record)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<LinkRecord>, AppError> {
        let row = self.store.get(TRACKING_TABLE, &link_row_key(code)).await?;
        Ok(row.as_ref().map(decode_link).transpose()?)
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self
            .store
            .get(TRACKING_TABLE, &link_row_key(code))
            .await?
            .is_some())
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        Ok(self
            .store
            .delete(TRACKING_TABLE, &link_row_key(code))
            .await?)
    }

    async fn rename(&self, record: &LinkRecord, new_code: &str) -> Result<LinkRecord, AppError> {
        let renamed = record.renamed(new_code);

        // The old row must still exist in the state `record` was read in;
        // a consumed or deleted link is never written back.
        let applied = self
            .store
            .write_batch(
                TRACKING_TABLE,
                vec![
                    Mutation::PutIfAbsent {
                        key: link_row_key(new_code),
                        columns: encode_link(&renamed),
                    },
                    Mutation::DeleteIf {
                        key: link_row_key(&record.short_code),
                        condition: CellCondition::new(
                            URL_INFO,
                            "is_active",
                            record.active.to_string(),
                        ),
                    },
                ],
            )
            .await?;

        if applied {
            return Ok(renamed);
        }

        if self.exists(new_code).await? {
            return Err(AppError::conflict(
                "Short code already exists",
                json!({ "code": new_code }),
            ));
        }
        if !self.exists(&record.short_code).await? {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": record.short_code }),
            ));
        }
        Err(AppError::conflict(
            "Short link changed during rename",
            json!({ "code": record.short_code }),
        ))
    }

    async fn deactivate(&self, code: &str) -> Result<bool, AppError> {
        Ok(self
            .store
            .check_and_put(
                TRACKING_TABLE,
                &link_row_key(code),
                CellCondition::new(URL_INFO, "is_active", "true"),
                Columns::new().with_cell(URL_INFO, "is_active", "false"),
            )
            .await?)
    }

    async fn search(&self, query: &str) -> Result<Vec<LinkRecord>, AppError> {
        let needle = query.trim().to_lowercase();
        let mut records: Vec<LinkRecord> = self
            .all_links()
            .await?
            .into_iter()
            .filter(|r| matches_query(r, &needle))
            .collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<LinkRecord>, AppError> {
        let mut records: Vec<LinkRecord> = self
            .all_links()
            .await?
            .into_iter()
            .filter(|r| r.owner_id == owner_id)
            .collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self
            .store
            .count_prefix(TRACKING_TABLE, LINK_KEY_PREFIX)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::link::default_expiration;
    use crate::domain::repositories::MockKeyValueStore;
    use crate::infrastructure::store::MemoryStore;
    use axum::http::StatusCode;

    fn new_link(code: &str, url: &str, owner: &str) -> NewLink {
        NewLink {
            code: code.to_string(),
            long_url: url.to_string(),
            owner_id: owner.to_string(),
            one_time_use: false,
            expiration_timestamp: default_expiration(),
        }
    }

    fn repo() -> KvLinkRepository {
        KvLinkRepository::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = repo();
        let created = repo
            .create(new_link("abc123", "example.com/a", "u1"))
            .await
            .unwrap();

        let found = repo.find_by_code("abc123").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(found.active);
        assert_eq!(found.custom_alias.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_create_conflict_keeps_existing() {
        let repo = repo();
        repo.create(new_link("promo", "example.com/b", "u1"))
            .await
            .unwrap();

        let err = repo
            .create(new_link("promo", "example.com/c", "u2"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let found = repo.find_by_code("promo").await.unwrap().unwrap();
        assert_eq!(found.long_url, "example.com/b");
        assert_eq!(found.owner_id, "u1");
    }

    #[tokio::test]
    async fn test_rename_moves_row() {
        let repo = repo();
        let original = repo
            .create(new_link("old01", "example.com/x", "u1"))
            .await
            .unwrap();

        let renamed = repo.rename(&original, "new01").await.unwrap();

        assert_eq!(renamed.short_code, "new01");
        assert_eq!(renamed.creation_timestamp, original.creation_timestamp);
        assert!(repo.find_by_code("old01").await.unwrap().is_none());
        assert_eq!(
            repo.find_by_code("new01").await.unwrap().unwrap().long_url,
            "example.com/x"
        );
    }

    #[tokio::test]
    async fn test_rename_onto_taken_code() {
        let repo = repo();
        let a = repo.create(new_link("aaa", "example.com/a", "u1")).await.unwrap();
        repo.create(new_link("bbb", "example.com/b", "u1")).await.unwrap();

        let err = repo.rename(&a, "bbb").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(repo.exists("aaa").await.unwrap());
        assert_eq!(
            repo.find_by_code("bbb").await.unwrap().unwrap().long_url,
            "example.com/b"
        );
    }

    #[tokio::test]
    async fn test_rename_of_consumed_link_is_rejected() {
        let repo = repo();
        let mut one_time = new_link("once", "example.com/o", "u1");
        one_time.one_time_use = true;
        let stale = repo.create(one_time).await.unwrap();

        assert!(repo.deactivate("once").await.unwrap());

        let err = repo.rename(&stale, "again").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(repo.find_by_code("again").await.unwrap().is_none());
        assert!(!repo.find_by_code("once").await.unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn test_rename_of_deleted_link_is_not_found() {
        let repo = repo();
        let stale = repo
            .create(new_link("gone", "example.com/g", "u1"))
            .await
            .unwrap();

        assert!(repo.delete("gone").await.unwrap());

        let err = repo.rename(&stale, "back").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(!repo.exists("back").await.unwrap());
    }

    #[tokio::test]
    async fn test_deactivate_only_once() {
        let repo = repo();
        repo.create(new_link("once1", "example.com", "u1")).await.unwrap();

        assert!(repo.deactivate("once1").await.unwrap());
        assert!(!repo.deactivate("once1").await.unwrap());
        assert!(!repo.find_by_code("once1").await.unwrap().unwrap().active);
        assert!(!repo.deactivate("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_search_case_insensitive() {
        let repo = repo();
        repo.create(new_link("promo", "example.com/b", "u1")).await.unwrap();
        repo.create(new_link("abc123", "example.com/PROMOTION", "u1"))
            .await
            .unwrap();
        repo.create(new_link("zzz", "other.org", "u1")).await.unwrap();

        let found = repo.search("PrOmO").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(repo.search("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_by_owner_and_count() {
        let repo = repo();
        repo.create(new_link("a01", "example.com/1", "u1")).await.unwrap();
        repo.create(new_link("a02", "example.com/2", "u2")).await.unwrap();
        repo.create(new_link("a03", "example.com/3", "u1")).await.unwrap();

        let owned = repo.list_by_owner("u1").await.unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|r| r.owner_id == "u1"));
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo();
        repo.create(new_link("gone", "example.com", "u1")).await.unwrap();

        assert!(repo.delete("gone").await.unwrap());
        assert!(!repo.delete("gone").await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_row_is_internal_error() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get().returning(|_, key| {
            Ok(Some(Row {
                key: key.to_string(),
                columns: Columns::new().with_cell(URL_INFO, "long_url", "example.com"),
            }))
        });

        let repo = KvLinkRepository::new(Arc::new(mock));
        let err = repo.find_by_code("abc").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_put_if_absent()
            .returning(|_, _, _| Err(StoreError::Unavailable("down".to_string())));

        let repo = KvLinkRepository::new(Arc::new(mock));
        let err = repo
            .create(new_link("abc", "example.com", "u1"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_encode_layout() {
        let record = LinkRecord {
            short_code: "abc".to_string(),
            long_url: "example.com".to_string(),
            owner_id: "u1".to_string(),
            creation_timestamp: Utc::now(),
            expiration_timestamp: default_expiration(),
            one_time_use: true,
            active: true,
            custom_alias: None,
        };

        let columns = encode_link(&record);
        assert_eq!(columns.cell(URL_INFO, "one_time"), Some("true"));
        assert_eq!(columns.cell(USER_INFO, "user_id"), Some("u1"));
        assert_eq!(columns.cell(URL_INFO, "custom_alias"), None);

        let decoded = decode_link(&Row {
            key: link_row_key("abc"),
            columns,
        })
        .unwrap();
        assert_eq!(decoded.expiration_timestamp, default_expiration());
        assert!(decoded.one_time_use);
    }
}
