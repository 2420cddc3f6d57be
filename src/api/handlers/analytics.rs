//! Handler for click analytics.

use axum::{Json, extract::State};

use crate::api::dto::clicks::{ClickDetail, ClickDetailsRequest};
use crate::api::extract::ValidatedJson;
use crate::error::AppError;
use crate::state::AppState;

/// Lists every click recorded for a code, oldest first.
///
/// # Endpoint
///
/// `POST /analytics/details`
///
/// # Request Body
///
/// ```json
/// { "shortCode": "abc123" }
/// ```
///
/// Clicks outlive their link, so a deleted or renamed code still returns
/// its history. Unknown codes return an empty list.
pub async fn click_details_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ClickDetailsRequest>,
) -> Result<Json<Vec<ClickDetail>>, AppError> {
    let clicks = state
        .click_service
        .details_for(payload.short_code.trim())
        .await?;

    Ok(Json(clicks.into_iter().map(Into::into).collect()))
}
