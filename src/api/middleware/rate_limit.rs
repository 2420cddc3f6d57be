//! Per-client rate limiting using a token bucket.

use axum::Router;
use axum::body::Body;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};
use tracing::warn;

use crate::state::AppState;

/// Sustained requests per second per client.
const PER_SECOND: u64 = 2;

/// Requests a client may burst above the sustained rate.
const BURST_SIZE: u32 = 100;

/// Applies the rate limiter to `router`.
///
/// # Limits
///
/// - **Rate**: 2 requests per second
/// - **Burst**: 100 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Key Extraction
///
/// - `behind_proxy = false`: the socket peer address
/// - `behind_proxy = true`: `X-Forwarded-For` / `X-Real-IP` / `Forwarded`,
///   falling back to the peer address. Enable only behind a trusted proxy.
///
/// The router must be served with `into_make_service_with_connect_info`.
pub fn apply(router: Router<AppState>, behind_proxy: bool) -> Router<AppState> {
    if behind_proxy {
        with_extractor(router, SmartIpKeyExtractor)
    } else {
        with_extractor(router, PeerIpKeyExtractor)
    }
}

fn with_extractor<K>(router: Router<AppState>, extractor: K) -> Router<AppState>
where
    K: KeyExtractor + Send + Sync + 'static,
    K::Key: Send + Sync + 'static,
{
    let Some(config) = GovernorConfigBuilder::default()
        .key_extractor(extractor)
        .per_second(PER_SECOND)
        .burst_size(BURST_SIZE)
        .finish()
    else {
        warn!("Invalid rate limit configuration, rate limiting disabled");
        return router;
    };

    let layer: GovernorLayer<K, NoOpMiddleware<QuantaInstant>, Body> =
        GovernorLayer::new(Arc::new(config));
    router.layer(layer)
}
