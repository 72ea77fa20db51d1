//! # chatauth_api
//!
//! HTTP API library for chatauth.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use chatauth_core::auth::AuthError;
use chatauth_core::auth::jwt::{SigningKey, TokenCodec};
use chatauth_core::auth::policy::AccessPolicy;
use chatauth_core::directory::IdentityDirectory;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::handlers::{account, auth, hello};

/// Route paths.
pub mod routes {
    pub const POST_AUTH_LOGIN: &str = "/auth/login";
    pub const POST_AUTH_REGISTER: &str = "/auth/register";
    pub const GET_API_HELLO: &str = "/api/hello";
    pub const GET_API_ME: &str = "/api/me";
    pub const GET_API_ADMIN_STATUS: &str = "/api/admin/status";
}

/// Shared application state passed to all handlers.
///
/// Everything here is read-only after startup except the directory's own storage.
#[derive(Clone)]
pub struct AppState {
    /// Identity lookup store.
    pub directory: Arc<dyn IdentityDirectory>,
    /// Token signer/validator holding the process-wide key.
    pub codec: Arc<TokenCodec>,
    /// Route access rules.
    pub policy: Arc<AccessPolicy>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Build state from config, decoding the signing secret.
    pub fn new(config: ApiConfig, directory: Arc<dyn IdentityDirectory>) -> Result<Self, AuthError> {
        let key = SigningKey::from_base64(&config.jwt_secret)?;
        let codec = TokenCodec::new(&key, chrono::Duration::seconds(config.token_ttl_secs));
        Ok(Self {
            directory,
            codec: Arc::new(codec),
            policy: Arc::new(AccessPolicy::standard()),
            config,
        })
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Access is decided by the policy table, not by route grouping.
    Router::new()
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::GET_API_HELLO, get(hello::hello_world))
        .route(routes::GET_API_ME, get(account::me_handler))
        .route(
            routes::GET_API_ADMIN_STATUS,
            get(account::admin_status_handler),
        )
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authorize,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ))
        .layer(cors)
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("No such route".into())
}
