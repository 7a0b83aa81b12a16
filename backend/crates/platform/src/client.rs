//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Label used when no location can be derived
pub const UNKNOWN_LOCATION: &str = "unknown";

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}

/// Extract the User-Agent header, if present and valid UTF-8
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Extract the token of an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

/// Derive a coarse location label from an IP address
///
/// Only the network class is resolved; there is no geo database.
/// Never fails: unresolvable input yields [`UNKNOWN_LOCATION`].
pub fn coarse_location(ip: Option<IpAddr>) -> String {
    let Some(ip) = ip else {
        return UNKNOWN_LOCATION.to_string();
    };

    let label = match ip {
        ip if ip.is_loopback() => "localhost",
        ip if ip.is_unspecified() => UNKNOWN_LOCATION,
        IpAddr::V4(v4) if v4.is_private() || v4.is_link_local() => "intranet",
        IpAddr::V6(v6) if (v6.segments()[0] & 0xfe00) == 0xfc00 => "intranet",
        IpAddr::V6(v6) if (v6.segments()[0] & 0xffc0) == 0xfe80 => "intranet",
        _ => "internet",
    };
    label.to_string()
}
