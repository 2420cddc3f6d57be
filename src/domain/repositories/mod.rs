//! Repository and store trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern. The
//! repositories speak in domain entities; the [`KeyValueStore`] underneath
//! speaks in rows and column families.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence` and
//!   `crate::infrastructure::store`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Traits
//!
//! - [`KeyValueStore`] - Row-level storage primitives
//! - [`LinkRepository`] - Link record CRUD, rename and search
//! - [`ClickRepository`] - Click log append and aggregation

pub mod click_repository;
pub mod key_value_store;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use key_value_store::{
    CellCondition, ColumnFamily, Columns, KeyValueStore, Mutation, Row, StoreError, StoreResult,
};
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
