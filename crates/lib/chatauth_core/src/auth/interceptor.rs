//! Bearer-token resolution for inbound requests.
//!
//! Framework-independent half of the request authentication step: the HTTP
//! layer hands in the raw `Authorization` header and gets back an optional
//! principal. Validation failures never escape as errors; they collapse to
//! "no principal" and the access policy decides what that means.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::jwt::TokenCodec;
use super::policy::RoutePattern;
use crate::models::auth::AuthenticatedPrincipal;

/// Authorization scheme prefix, including the separating space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization` header value.
///
/// Returns `None` when the header is absent, uses another scheme, or carries
/// an empty token.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the principal carried by an `Authorization` header, if any.
pub fn resolve_principal(
    codec: &TokenCodec,
    header: Option<&str>,
    now: DateTime<Utc>,
) -> Option<AuthenticatedPrincipal> {
    let token = bearer_token(header)?;
    match codec.validate(token, now) {
        Ok(principal) => Some(principal),
        Err(e) => {
            debug!(reason = e.kind(), "bearer token rejected");
            None
        }
    }
}

/// Whether `path` is on the exempt allow-list (never inspected for tokens).
pub fn is_exempt(exempt: &[RoutePattern], path: &str) -> bool {
    exempt.iter().any(|p| p.matches(path))
}
