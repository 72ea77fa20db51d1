//! Authentication middleware: Bearer token resolution and route access policy.
//!
//! Two layers, outermost first:
//! 1. [`authenticate`] attaches a [`RequestAuth`] to every request. It never
//!    rejects; a missing or invalid token simply leaves the principal empty.
//! 2. [`authorize`] consults the [`AccessPolicy`](chatauth_core::auth::policy::AccessPolicy)
//!    and turns a failed requirement into 401/403 before any handler runs.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chatauth_core::auth::interceptor::{is_exempt, resolve_principal};
use chatauth_core::auth::policy::AccessDecision;
use chatauth_core::models::auth::AuthenticatedPrincipal;
use chrono::Utc;
use tracing::debug;

use crate::AppState;
use crate::error::{AUTH_FAILED_MESSAGE, AppError};

/// Per-request authentication outcome, stored in request extensions.
#[derive(Debug, Clone, Default)]
pub struct RequestAuth {
    pub principal: Option<AuthenticatedPrincipal>,
}

/// Extension handed to handlers on requests that carry a valid token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AuthenticatedPrincipal);

/// Axum middleware: resolves `Authorization: Bearer <token>` into a principal.
///
/// Exempt paths are passed through without looking at the header. Runs at
/// most once per request: an existing `RequestAuth` is left untouched.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<RequestAuth>().is_some() {
        return next.run(request).await;
    }

    let path = request.uri().path();
    let auth = if is_exempt(&state.config.exempt_paths, path) {
        RequestAuth::default()
    } else {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        RequestAuth {
            principal: resolve_principal(&state.codec, header, Utc::now()),
        }
    };

    if let Some(principal) = &auth.principal {
        request
            .extensions_mut()
            .insert(AuthenticatedUser(principal.clone()));
    }
    request.extensions_mut().insert(auth);

    next.run(request).await
}

/// Axum middleware: enforces the route access policy.
pub async fn authorize(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = request
        .extensions()
        .get::<RequestAuth>()
        .and_then(|auth| auth.principal.as_ref());

    match state.policy.evaluate(request.uri().path(), principal) {
        AccessDecision::Allow => Ok(next.run(request).await),
        AccessDecision::Unauthenticated => {
            debug!(path = request.uri().path(), "rejected unauthenticated request");
            Err(AppError::Unauthorized(AUTH_FAILED_MESSAGE.into()))
        }
        AccessDecision::Forbidden => {
            debug!(path = request.uri().path(), "rejected request lacking role");
            Err(AppError::Forbidden("Insufficient role".into()))
        }
    }
}
