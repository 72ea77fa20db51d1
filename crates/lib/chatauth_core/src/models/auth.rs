//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API request/response
//! shapes in `chatauth_api::models` (which have `#[serde(rename)]` for camelCase etc.).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capability tag carried by an identity. Roles form a flat set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    /// Wire name used in token claims and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Role::User),
            "ROLE_ADMIN" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Stored identity record, as returned by an [`IdentityDirectory`](crate::directory::IdentityDirectory).
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
    pub enabled: bool,
    pub locked: bool,
    pub expired: bool,
    pub credentials_expired: bool,
}

/// Input for creating an identity. Account flags start in the active state.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

impl NewIdentity {
    pub(crate) fn into_identity(self, id: Uuid) -> Identity {
        Identity {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            roles: self.roles,
            enabled: true,
            locked: false,
            expired: false,
            credentials_expired: false,
        }
    }
}

/// Login credentials. Consumed by the verifier; the password never appears in `Debug` output.
pub struct Credentials {
    /// Username or email.
    pub identifier: String,
    pub password: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the username.
    pub sub: String,
    /// Role names at issuance time (e.g. `["ROLE_USER"]`).
    #[serde(default)]
    pub roles: Vec<String>,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// A freshly signed token together with its validity window.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Identity resolved from a valid token, scoped to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub subject: String,
    pub roles: BTreeSet<Role>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthenticatedPrincipal {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in [Role::User, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(
            "ROLE_ROOT".parse::<Role>(),
            Err(UnknownRole("ROLE_ROOT".into()))
        );
    }

    #[test]
    fn role_serializes_with_wire_name() {
        let json = serde_json::to_string(&vec![Role::User, Role::Admin]).unwrap();
        assert_eq!(json, r#"["ROLE_USER","ROLE_ADMIN"]"#);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("alice", "hunter22");
        let out = format!("{creds:?}");
        assert!(out.contains("alice"));
        assert!(!out.contains("hunter22"));
    }
}
