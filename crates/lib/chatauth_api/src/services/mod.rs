//! Service layer between handlers and `chatauth_core`.

pub mod auth;
