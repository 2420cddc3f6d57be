//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use std::net::SocketAddr;

use crate::domain::click_event::ClickContext;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a short code to its destination.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Build the click context from forwarding headers, `User-Agent` and `Referer`
/// 2. Resolve the code (cache first, then store)
/// 3. Queue the click event for the background worker
/// 4. Return 302 Found with the destination in `Location`
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown, inactive or already consumed.
/// Returns 410 Gone if the link has expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let context = ClickContext::new(
        client_ip(&headers, addr),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    let resolution = state.link_service.resolve(&code, context).await?;

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, resolution.destination)],
    ))
}
