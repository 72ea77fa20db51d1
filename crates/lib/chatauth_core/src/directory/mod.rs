//! Identity directory: the lookup store behind credential verification.
//!
//! The core only reads identities during authentication; `create` exists for
//! the registration flow. Storage backends implement [`IdentityDirectory`].

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::{Identity, NewIdentity};

pub use memory::MemoryDirectory;

/// Directory errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Identity already exists: {0}")]
    Conflict(String),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookup store mapping a username or email to a stored identity.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Find an identity whose username equals `identifier`, or failing that,
    /// whose email matches it case-insensitively.
    async fn find_by_identifier(&self, identifier: &str)
    -> Result<Option<Identity>, DirectoryError>;

    /// Insert a new identity. Fails with [`DirectoryError::Conflict`] if the
    /// username or email is already taken; nothing is stored in that case.
    async fn create(&self, identity: NewIdentity) -> Result<Identity, DirectoryError>;

    /// Short backend name for diagnostics.
    fn name(&self) -> &str;
}
