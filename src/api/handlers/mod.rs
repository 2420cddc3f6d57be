//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod analytics;
pub mod health;
pub mod links;
pub mod redirect;
pub mod search;
pub mod shorten;

pub use analytics::click_details_handler;
pub use health::health_handler;
pub use links::{delete_link_handler, owner_links_handler, rename_link_handler};
pub use redirect::redirect_handler;
pub use search::search_handler;
pub use shorten::shorten_handler;
