//! API route configuration.
//!
//! Management and analytics endpoints. The redirect and health routes live in
//! [`crate::routes`] next to the catch-all `/{code}` path.

use crate::api::handlers::{
    click_details_handler, owner_links_handler, rename_link_handler, search_handler,
    shorten_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

/// Link management and analytics routes.
///
/// # Endpoints
///
/// - `POST /shorten`                 - Create a short link
/// - `GET  /search?query=`           - Search links with click counts
/// - `GET  /users/{owner_id}/links`  - One owner's links with click counts
/// - `POST /analytics/details`       - Click history for a code
/// - `PUT  /update-shortcode`        - Move a link to a new code
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/search", get(search_handler))
        .route("/users/{owner_id}/links", get(owner_links_handler))
        .route("/analytics/details", post(click_details_handler))
        .route("/update-shortcode", put(rename_link_handler))
}
