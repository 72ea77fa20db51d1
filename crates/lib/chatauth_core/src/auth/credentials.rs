//! Credential verification against the identity directory.

use tokio::task;

use super::AuthError;
use super::password::{dummy_hash, verify_password};
use crate::directory::IdentityDirectory;
use crate::models::auth::{Credentials, Identity};

/// Verify `credentials` against the directory, returning the stored identity.
///
/// Unknown identifiers still pay for a bcrypt comparison so the two failure
/// paths take comparable time. Account flags are only checked once the
/// password has matched.
pub async fn verify_credentials(
    directory: &dyn IdentityDirectory,
    credentials: Credentials,
) -> Result<Identity, AuthError> {
    let Credentials {
        identifier,
        password,
    } = credentials;

    let identity = directory.find_by_identifier(&identifier).await?;

    let Some(identity) = identity else {
        if let Some(hash) = dummy_hash() {
            let _ = check_password(password, hash.to_string()).await;
        }
        return Err(AuthError::NotFound);
    };

    if !check_password(password, identity.password_hash.clone()).await? {
        return Err(AuthError::BadCredentials);
    }

    check_account_status(&identity)?;
    Ok(identity)
}

/// Reject identities whose account flags block authentication.
pub fn check_account_status(identity: &Identity) -> Result<(), AuthError> {
    if !identity.enabled {
        return Err(AuthError::AccountDisabled);
    }
    if identity.locked {
        return Err(AuthError::AccountLocked);
    }
    if identity.expired {
        return Err(AuthError::AccountExpired);
    }
    if identity.credentials_expired {
        return Err(AuthError::CredentialsExpired);
    }
    Ok(())
}

/// bcrypt is CPU-bound; keep it off the async workers.
async fn check_password(password: String, hash: String) -> Result<bool, AuthError> {
    task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("password check task: {e}")))?
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use async_trait::async_trait;

    use super::*;
    use crate::auth::password::hash_password;
    use crate::directory::{DirectoryError, MemoryDirectory};
    use crate::models::auth::{NewIdentity, Role};

    async fn directory_with_alice() -> MemoryDirectory {
        let dir = MemoryDirectory::new();
        dir.create(NewIdentity {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: hash_password("s3cret-pw").unwrap(),
            roles: BTreeSet::from([Role::User]),
        })
        .await
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn accepts_username_or_email() {
        let dir = directory_with_alice().await;

        let by_name = verify_credentials(&dir, Credentials::new("alice", "s3cret-pw"))
            .await
            .unwrap();
        assert_eq!(by_name.username, "alice");

        let by_email =
            verify_credentials(&dir, Credentials::new("alice@example.com", "s3cret-pw"))
                .await
                .unwrap();
        assert_eq!(by_email.id, by_name.id);
    }

    #[tokio::test]
    async fn wrong_password_is_bad_credentials() {
        let dir = directory_with_alice().await;
        let err = verify_credentials(&dir, Credentials::new("alice", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::BadCredentials));
    }

    #[tokio::test]
    async fn unknown_identifier_is_not_found() {
        let dir = directory_with_alice().await;
        let err = verify_credentials(&dir, Credentials::new("mallory", "s3cret-pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
        assert!(err.is_authentication_failure());
    }

    #[tokio::test]
    async fn account_flags_block_after_password_match() {
        let dir = directory_with_alice().await;
        let base = dir.find_by_identifier("alice").await.unwrap().unwrap();

        let cases: [(fn(&mut Identity), fn(&AuthError) -> bool); 4] = [
            (|i| i.enabled = false, |e| matches!(e, AuthError::AccountDisabled)),
            (|i| i.locked = true, |e| matches!(e, AuthError::AccountLocked)),
            (|i| i.expired = true, |e| matches!(e, AuthError::AccountExpired)),
            (
                |i| i.credentials_expired = true,
                |e| matches!(e, AuthError::CredentialsExpired),
            ),
        ];

        for (mutate, expected) in cases {
            let mut identity = base.clone();
            mutate(&mut identity);
            assert!(dir.replace(identity));

            let err = verify_credentials(&dir, Credentials::new("alice", "s3cret-pw"))
                .await
                .unwrap_err();
            assert!(expected(&err), "unexpected error: {err:?}");

            // A wrong password never reveals the account state.
            let err = verify_credentials(&dir, Credentials::new("alice", "nope"))
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::BadCredentials));

            assert!(dir.replace(base.clone()));
        }
    }

    struct DownDirectory;

    #[async_trait]
    impl IdentityDirectory for DownDirectory {
        async fn find_by_identifier(
            &self,
            _identifier: &str,
        ) -> Result<Option<Identity>, DirectoryError> {
            Err(DirectoryError::Unavailable("connection refused".into()))
        }

        async fn create(&self, _identity: NewIdentity) -> Result<Identity, DirectoryError> {
            Err(DirectoryError::Unavailable("connection refused".into()))
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    #[tokio::test]
    async fn directory_outage_is_not_an_authentication_failure() {
        let err = verify_credentials(&DownDirectory, Credentials::new("alice", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Directory(_)));
        assert!(!err.is_authentication_failure());
    }
}
