//! Data Transfer Objects for API request/response serialization.
//!
//! JSON field names are camelCase.

pub mod clicks;
pub mod health;
pub mod links;
pub mod shorten;
