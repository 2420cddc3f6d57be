//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, caching and click dispatch. Services consume repository traits
//! and provide a narrow API for the HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link creation, resolution, rename, removal and search
//! - [`services::click_service::ClickService`] - Click recording and aggregation

pub mod services;
