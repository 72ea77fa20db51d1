//! Hello world endpoint: public liveness check.

use axum::Json;

use crate::models::HelloResponse;

/// `GET /api/hello`: reports the core library version.
pub async fn hello_world() -> Json<HelloResponse> {
    Json(HelloResponse {
        greeting: format!("Hello from chatauth_core v{}", chatauth_core::version()),
    })
}
