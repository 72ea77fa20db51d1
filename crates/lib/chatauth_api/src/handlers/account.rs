//! Handlers for authenticated callers.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{AdminStatusResponse, PrincipalResponse};

/// `GET /api/me`: the caller's identity as carried by their token.
pub async fn me_handler(
    Extension(AuthenticatedUser(principal)): Extension<AuthenticatedUser>,
) -> Json<PrincipalResponse> {
    Json(PrincipalResponse {
        subject: principal.subject,
        roles: principal.roles.iter().map(|r| r.to_string()).collect(),
        issued_at: principal.issued_at,
        expires_at: principal.expires_at,
    })
}

/// `GET /api/admin/status`: service status for admins.
pub async fn admin_status_handler(State(state): State<AppState>) -> Json<AdminStatusResponse> {
    Json(AdminStatusResponse {
        version: chatauth_core::version().to_string(),
        directory: state.directory.name().to_string(),
        token_ttl_secs: state.codec.ttl().num_seconds(),
    })
}
