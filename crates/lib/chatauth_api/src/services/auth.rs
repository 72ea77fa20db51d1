//! Authentication service: login/register flows delegating to `chatauth_core::auth`.

use std::collections::BTreeSet;

use chatauth_core::auth::AuthError;
use chatauth_core::auth::credentials::verify_credentials;
use chatauth_core::auth::jwt::TokenCodec;
use chatauth_core::auth::password::hash_password;
use chatauth_core::directory::IdentityDirectory;
use chatauth_core::models::auth::{Credentials, Identity, NewIdentity, Role};
use chrono::{DateTime, Utc};
use tokio::task;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::TokenResponse;

/// Authenticate with username-or-email + password and issue an access token.
///
/// Every authentication failure surfaces as the same `Unauthorized` error.
pub async fn login(
    directory: &dyn IdentityDirectory,
    codec: &TokenCodec,
    credentials: Credentials,
    now: DateTime<Utc>,
) -> AppResult<TokenResponse> {
    let identity = match verify_credentials(directory, credentials).await {
        Ok(identity) => identity,
        Err(e) => {
            if e.is_authentication_failure() {
                warn!(reason = %e, "login rejected");
            }
            return Err(AppError::from(e));
        }
    };

    let issued = codec
        .issue(&identity.username, &identity.roles, now)
        .map_err(AuthError::from)?;
    info!(username = %identity.username, "login succeeded");

    Ok(TokenResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        id: identity.id,
        subject: identity.username,
        email: identity.email,
        roles: identity.roles.iter().map(|r| r.to_string()).collect(),
        expires_in: codec.ttl().num_seconds(),
    })
}

/// Register a new identity with `ROLE_USER`.
pub async fn register(
    directory: &dyn IdentityDirectory,
    username: &str,
    email: &str,
    password: &str,
) -> AppResult<Identity> {
    create_identity(directory, username, email, password, BTreeSet::from([Role::User])).await
}

/// Create an admin identity at startup (no-op if the username already exists).
pub async fn seed_admin(
    directory: &dyn IdentityDirectory,
    username: &str,
    email: &str,
    password: &str,
) -> AppResult<()> {
    let roles = BTreeSet::from([Role::User, Role::Admin]);
    match create_identity(directory, username, email, password, roles).await {
        Ok(_) => Ok(()),
        Err(AppError::Conflict(_)) => {
            info!(username, "admin identity already present");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn create_identity(
    directory: &dyn IdentityDirectory,
    username: &str,
    email: &str,
    password: &str,
    roles: BTreeSet<Role>,
) -> AppResult<Identity> {
    let password = password.to_string();
    let password_hash = task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hash task: {e}")))??;

    let identity = directory
        .create(NewIdentity {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            roles,
        })
        .await
        .map_err(AuthError::from)?;

    info!(username = %identity.username, roles = ?identity.roles, "identity registered");
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use chatauth_core::auth::jwt::SigningKey;
    use chatauth_core::directory::MemoryDirectory;
    use chrono::Duration;

    use super::*;
    use crate::error::AUTH_FAILED_MESSAGE;

    fn codec() -> TokenCodec {
        TokenCodec::new(&SigningKey::generate(), Duration::minutes(15))
    }

    #[tokio::test]
    async fn login_issues_token_for_registered_identity() {
        let dir = MemoryDirectory::new();
        let codec = codec();
        register(&dir, "alice", "alice@example.com", "password1")
            .await
            .unwrap();

        let now = Utc::now();
        let resp = login(&dir, &codec, Credentials::new("alice", "password1"), now)
            .await
            .unwrap();
        assert_eq!(resp.token_type, "Bearer");
        assert_eq!(resp.subject, "alice");
        assert_eq!(resp.roles, vec!["ROLE_USER".to_string()]);
        assert_eq!(resp.expires_in, 15 * 60);

        let principal = codec.validate(&resp.token, now).unwrap();
        assert_eq!(principal.subject, "alice");
    }

    #[tokio::test]
    async fn failures_are_indistinguishable() {
        let dir = MemoryDirectory::new();
        let codec = codec();
        register(&dir, "alice", "alice@example.com", "password1")
            .await
            .unwrap();

        for creds in [
            Credentials::new("alice", "wrong-password"),
            Credentials::new("nobody", "password1"),
        ] {
            match login(&dir, &codec, creds, Utc::now()).await {
                Err(AppError::Unauthorized(msg)) => assert_eq!(msg, AUTH_FAILED_MESSAGE),
                other => panic!("unexpected result: {:?}", other.map(|r| r.subject)),
            }
        }
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let dir = MemoryDirectory::new();
        register(&dir, "alice", "alice@example.com", "password1")
            .await
            .unwrap();
        let err = register(&dir, "alice", "other@example.com", "password1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(dir.len(), 1);
    }

    #[tokio::test]
    async fn seed_admin_is_idempotent() {
        let dir = MemoryDirectory::new();
        seed_admin(&dir, "root", "root@example.com", "password1")
            .await
            .unwrap();
        seed_admin(&dir, "root", "root@example.com", "password1")
            .await
            .unwrap();
        let admin = dir.find_by_identifier("root").await.unwrap().unwrap();
        assert!(admin.roles.contains(&Role::Admin));
        assert_eq!(dir.len(), 1);
    }
}
