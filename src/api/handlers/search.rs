//! Handler for link search.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::links::{LinkSummaryResponse, SearchQuery};
use crate::error::AppError;
use crate::state::AppState;

/// Searches links by code, alias or destination, with click counts.
///
/// # Endpoint
///
/// `GET /search?query=promo`
///
/// Matching is a case-insensitive substring match. An empty query lists
/// every link. Results are ordered newest first.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<LinkSummaryResponse>>, AppError> {
    let summaries = state
        .link_service
        .search_with_counts(&params.query)
        .await?;

    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}
