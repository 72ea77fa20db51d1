//! API server configuration.

use std::fmt;

use chatauth_core::auth::jwt::{DEFAULT_TOKEN_TTL_SECS, resolve_jwt_secret};
use chatauth_core::auth::policy::RoutePattern;

/// Default allow-list of paths the authentication middleware never inspects.
pub const DEFAULT_EXEMPT_PATHS: &str = "/auth/**";

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// Base64-encoded JWT signing secret (at least 64 bytes decoded).
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Paths exempt from bearer-token processing.
    pub exempt_paths: Vec<RoutePattern>,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable              | Default                               |
    /// |-----------------------|---------------------------------------|
    /// | `BIND_ADDR`           | `127.0.0.1:8080`                      |
    /// | `JWT_SECRET`          | generated & persisted to file         |
    /// | `JWT_EXPIRATION_SECS` | `900`                                 |
    /// | `AUTH_EXEMPT_PATHS`   | `/auth/**` (comma-separated patterns) |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            jwt_secret: resolve_jwt_secret(),
            token_ttl_secs: std::env::var("JWT_EXPIRATION_SECS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            exempt_paths: parse_exempt_paths(
                &std::env::var("AUTH_EXEMPT_PATHS")
                    .unwrap_or_else(|_| DEFAULT_EXEMPT_PATHS.into()),
            ),
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("exempt_paths", &self.exempt_paths)
            .finish()
    }
}

/// Parse a comma-separated list of route patterns, skipping blanks.
pub fn parse_exempt_paths(list: &str) -> Vec<RoutePattern> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(RoutePattern::parse)
        .collect()
}
