//! Handler for link creation.

use axum::{Json, extract::State};

use crate::api::dto::shorten::{LinkResponse, ShortenRequest};
use crate::api::extract::ValidatedJson;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Code Selection
///
/// - With a non-empty `customAlias`: the alias is used as the code
/// - Otherwise: the first 6 hex chars of SHA-256 over `longUrl`, salted on collision
///
/// # Errors
///
/// Returns 400 Bad Request for an invalid body, URL, alias or expiration.
/// Returns 409 Conflict if the code is already taken.
pub async fn shorten_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ShortenRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let record = state.link_service.create(payload.into()).await?;

    Ok(Json(record.into()))
}
