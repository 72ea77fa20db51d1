//! In-memory identity directory.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::{DirectoryError, IdentityDirectory};
use crate::models::auth::{Identity, NewIdentity};

/// Concurrent in-memory directory keyed by username, with an email index.
///
/// Usernames and emails share one identifier space: a username may not equal
/// any stored email (case-insensitively) and vice versa.
pub struct MemoryDirectory {
    by_username: DashMap<String, Identity>,
    /// Lowercased email → username.
    by_email: DashMap<String, String>,
    /// Serializes `create` so the cross-index uniqueness checks and inserts are atomic.
    writer: Mutex<()>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            by_username: DashMap::new(),
            by_email: DashMap::new(),
            writer: Mutex::new(()),
        }
    }

    /// Number of stored identities.
    pub fn len(&self) -> usize {
        self.by_username.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_username.is_empty()
    }

    /// Replace a stored identity wholesale (matched by username).
    ///
    /// Used to flip account flags; username and email must be unchanged.
    pub fn replace(&self, identity: Identity) -> bool {
        match self.by_username.get_mut(&identity.username) {
            Some(mut slot) if slot.email.eq_ignore_ascii_case(&identity.email) => {
                *slot = identity;
                true
            }
            _ => false,
        }
    }

    fn lookup_username(&self, username: &str) -> Option<Identity> {
        self.by_username.get(username).map(|e| e.value().clone())
    }

    fn lookup_email(&self, email: &str) -> Option<Identity> {
        // Clone the username out so the email shard is released before the second lookup.
        let username = self.by_email.get(&email.to_lowercase())?.value().clone();
        self.lookup_username(&username)
    }

    fn insert(&self, identity: NewIdentity) -> Result<Identity, DirectoryError> {
        let _guard = self
            .writer
            .lock()
            .map_err(|_| DirectoryError::Unavailable("directory writer lock poisoned".into()))?;

        let email_key = identity.email.to_lowercase();
        if self.by_username.contains_key(&identity.username)
            || self.by_email.contains_key(&identity.username.to_lowercase())
        {
            return Err(DirectoryError::Conflict(format!(
                "username '{}' is already taken",
                identity.username
            )));
        }
        if self.by_email.contains_key(&email_key)
            || self.by_username.contains_key(&identity.email)
            || self.by_username.contains_key(&email_key)
        {
            return Err(DirectoryError::Conflict(format!(
                "email '{}' is already registered",
                identity.email
            )));
        }

        self.by_email.insert(email_key, identity.username.clone());
        let stored = identity.into_identity(Uuid::now_v7());
        self.by_username.insert(stored.username.clone(), stored.clone());
        Ok(stored)
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityDirectory for MemoryDirectory {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Identity>, DirectoryError> {
        // Anything shaped like an email resolves through the email index first.
        let found = if identifier.contains('@') {
            self.lookup_email(identifier)
                .or_else(|| self.lookup_username(identifier))
        } else {
            self.lookup_username(identifier)
                .or_else(|| self.lookup_email(identifier))
        };
        Ok(found)
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, DirectoryError> {
        self.insert(identity)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
