//! Key-value store backends.
//!
//! - [`MemoryStore`] - in-process ordered maps
//! - [`PgStore`] - PostgreSQL `kv_rows` table
//! - [`TimedStore`] - timeout decorator applied to whichever backend is configured

mod memory_store;
mod pg_store;
mod timed_store;

pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
pub use timed_store::TimedStore;
