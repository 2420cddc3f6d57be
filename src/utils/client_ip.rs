//! Client IP extraction from HTTP request headers.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Forwarding headers consulted in priority order.
pub const FORWARDING_HEADERS: &[&str] = &[
    "cf-connecting-ip",
    "x-forwarded-for",
    "proxy-client-ip",
    "wl-proxy-client-ip",
];

/// Returns the originating client address for a request.
///
/// The first forwarding header whose whole value is non-empty and not
/// `unknown` is chosen, and its first comma-separated entry is returned.
/// Entries are not inspected individually: `unknown, 203.0.113.7` yields
/// `unknown`, and lower-priority headers are not consulted. Without such a
/// header, or when the chosen entry is blank, the socket peer address is used.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// assert_eq!(client_ip(&headers, peer), "203.0.113.7");
/// ```
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    FORWARDING_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty() && !value.eq_ignore_ascii_case("unknown"))
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}
