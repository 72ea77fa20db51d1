//! # chatauth_core
//!
//! Core authentication logic for chatauth: identity directory, credential
//! verification, token issuance/validation, and route access policy.

pub mod auth;
pub mod directory;
pub mod models;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
