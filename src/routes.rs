//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET    /{code}`   - Short link redirect
//! - `DELETE /{code}`   - Delete a link
//! - `GET    /health`   - Health check: store, cache, click queue
//! - everything in [`crate::api::routes`]
//!
//! Static segments (`/shorten`, `/search`, ...) take precedence over `/{code}`,
//! which is why those words are reserved as aliases.
//!
//! # Middleware
//!
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Permissive, the API is called from browser frontends
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{delete_link_handler, health_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let router = rate_limit::apply(routes(), behind_proxy)
        .with_state(state)
        .layer(tracing::layer())
        .layer(CorsLayer::permissive());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Every route, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{code}", get(redirect_handler).delete(delete_link_handler))
        .route("/health", get(health_handler))
        .merge(api::routes::routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::LinkServiceOptions;
    use crate::infrastructure::cache::NullCache;
    use crate::infrastructure::store::MemoryStore;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{Request, StatusCode};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn request(uri: &str) -> Request<Body> {
        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        let mut request = Request::get(uri).body(Body::empty()).unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        request
    }

    #[tokio::test]
    async fn test_app_router_trims_trailing_slash() {
        let (tx, _rx) = mpsc::channel(8);
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NullCache::new()),
            tx,
            LinkServiceOptions::default(),
        );

        let response = app_router(state, false)
            .oneshot(request("/health/"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_app_router_unknown_code() {
        let (tx, _rx) = mpsc::channel(8);
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NullCache::new()),
            tx,
            LinkServiceOptions::default(),
        );

        let response = app_router(state, true)
            .oneshot(request("/missing"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
