//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chatauth_core::models::auth::Credentials;
use chrono::Utc;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{LoginRequest, MessageResponse, RegisterRequest, TokenResponse};
use crate::services::auth;

/// `POST /auth/login`: authenticate with username-or-email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let credentials = Credentials::new(body.identifier, body.password);
    let resp = auth::login(
        state.directory.as_ref(),
        &state.codec,
        credentials,
        Utc::now(),
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /auth/register`: create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    body.validate()?;
    auth::register(
        state.directory.as_ref(),
        &body.username,
        &body.email,
        &body.password,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            success: true,
            message: "User registered successfully".into(),
        }),
    ))
}
