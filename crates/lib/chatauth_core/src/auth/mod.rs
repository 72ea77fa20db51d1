//! Authentication and authorization logic.
//!
//! Provides password hashing, credential verification, JWT issuance and
//! validation, bearer-token resolution, and the route access policy that
//! `chatauth_api` wires into its request pipeline.

pub mod credentials;
pub mod interceptor;
pub mod jwt;
pub mod password;
pub mod policy;

use thiserror::Error;

use crate::directory::DirectoryError;

/// Token validation and signing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token encoding failed: {0}")]
    Encode(String),
}

impl TokenError {
    /// Short, non-sensitive label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::BadSignature => "bad_signature",
            TokenError::Expired => "expired",
            TokenError::Encode(_) => "encode",
        }
    }
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Identity not found")]
    NotFound,

    #[error("Bad credentials")]
    BadCredentials,

    #[error("Account disabled")]
    AccountDisabled,

    #[error("Account locked")]
    AccountLocked,

    #[error("Account expired")]
    AccountExpired,

    #[error("Credentials expired")]
    CredentialsExpired,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether this is a rejection of the presented credentials/token, as opposed
    /// to an infrastructure failure.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            AuthError::NotFound
                | AuthError::BadCredentials
                | AuthError::AccountDisabled
                | AuthError::AccountLocked
                | AuthError::AccountExpired
                | AuthError::CredentialsExpired
                | AuthError::Token(
                    TokenError::Malformed | TokenError::BadSignature | TokenError::Expired
                )
        )
    }
}

impl From<DirectoryError> for AuthError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Conflict(msg) => AuthError::Conflict(msg),
            DirectoryError::Unavailable(msg) => AuthError::Directory(msg),
        }
    }
}
