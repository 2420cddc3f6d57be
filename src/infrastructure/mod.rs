//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for storage and caching.
//!
//! # Modules
//!
//! - [`store`] - Key-value store backends (memory, PostgreSQL, timeout decorator)
//! - [`persistence`] - Link and click repositories over the key-value store
//! - [`cache`] - Link record cache (Redis and no-op implementations)

pub mod cache;
pub mod persistence;
pub mod store;
