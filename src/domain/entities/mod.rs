//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures; the rules that depend only on a
//! single record (expiration, activity, destination normalization) live on
//! the entity itself.
//!
//! # Entity Types
//!
//! - [`LinkRecord`] - A short code mapped to its destination
//! - [`Click`] - An immutable click event on a short code
//! - [`LinkSummary`] - A link joined with its click count
//!
//! `NewLink` and `NewClick` carry creation input. Link creation times are
//! stamped by the repository; a click carries the time it was resolved.

pub mod click;
pub mod link;
pub mod summary;

pub use click::{Click, NewClick};
pub use link::{LinkRecord, LinkStatus, NewLink};
pub use summary::LinkSummary;
