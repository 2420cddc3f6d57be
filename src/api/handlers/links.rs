//! Handlers for link management endpoints (delete, rename, owner listing).

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::links::{DeleteResponse, LinkSummaryResponse, RenameRequest};
use crate::api::dto::shorten::LinkResponse;
use crate::api::extract::ValidatedJson;
use crate::error::AppError;
use crate::state::AppState;

/// Deletes a link.
///
/// # Endpoint
///
/// `DELETE /{code}`
///
/// Idempotent: deleting an unknown code also returns 200. Recorded clicks
/// are retained unless `CASCADE_DELETE_CLICKS` is enabled.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.link_service.remove(&code).await?;

    Ok(Json(DeleteResponse { deleted: code }))
}

/// Moves a link to a new short code.
///
/// # Endpoint
///
/// `PUT /update-shortcode`
///
/// # Request Body
///
/// ```json
/// { "oldCode": "abc123", "newCode": "spring-sale" }
/// ```
///
/// # Errors
///
/// Returns 400 for an invalid new code, 404 if `oldCode` does not exist and
/// 409 if `newCode` is taken.
pub async fn rename_link_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RenameRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let renamed = state
        .link_service
        .rename(&payload.old_code, &payload.new_code)
        .await?;

    Ok(Json(renamed.into()))
}

/// Lists one owner's links with click counts, newest first.
///
/// # Endpoint
///
/// `GET /users/{owner_id}/links`
pub async fn owner_links_handler(
    Path(owner_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<LinkSummaryResponse>>, AppError> {
    let summaries = state
        .link_service
        .owner_links_with_counts(&owner_id)
        .await?;

    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}
