//! API request and response shapes (camelCase on the wire).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Error body returned for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// `POST /auth/login` body. `username` is accepted as an alias for older clients.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub identifier: String,
    pub password: String,
}

/// `POST /auth/register` body.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Field-level checks: lengths and a plausible email shape.
    pub fn validate(&self) -> Result<(), AppError> {
        let username_len = self.username.trim().chars().count();
        if !(3..=20).contains(&username_len) {
            return Err(AppError::Validation(
                "Username must be between 3 and 20 characters".into(),
            ));
        }
        if self.username.trim() != self.username {
            return Err(AppError::Validation(
                "Username must not start or end with whitespace".into(),
            ));
        }
        if self.username.contains('@') {
            return Err(AppError::Validation(
                "Username must not contain '@'".into(),
            ));
        }
        let password_len = self.password.chars().count();
        if !(6..=40).contains(&password_len) {
            return Err(AppError::Validation(
                "Password must be between 6 and 40 characters".into(),
            ));
        }
        if self.email.chars().count() > 100 {
            return Err(AppError::Validation(
                "Email cannot exceed 100 characters".into(),
            ));
        }
        if !is_plausible_email(&self.email) {
            return Err(AppError::Validation("Email address is not valid".into()));
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub id: Uuid,
    pub subject: String,
    pub email: String,
    pub roles: Vec<String>,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// `GET /api/me` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalResponse {
    pub subject: String,
    pub roles: Vec<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// `GET /api/hello` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloResponse {
    pub greeting: String,
}

/// `GET /api/admin/status` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusResponse {
    pub version: String,
    pub directory: String,
    pub token_ttl_secs: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_reasonable_registration() {
        assert!(request("alice", "alice@example.com", "secret1").validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(request("al", "alice@example.com", "secret1").validate().is_err());
        assert!(request(&"a".repeat(21), "alice@example.com", "secret1").validate().is_err());
        assert!(request(" alice", "alice@example.com", "secret1").validate().is_err());
        assert!(request("bob@ex.com", "alice@example.com", "secret1").validate().is_err());
        assert!(request("alice", "alice@example.com", "12345").validate().is_err());
        assert!(request("alice", "alice@example.com", &"p".repeat(41)).validate().is_err());
        let long_email = format!("{}@example.com", "a".repeat(95));
        assert!(request("alice", &long_email, "secret1").validate().is_err());
    }

    #[test]
    fn rejects_implausible_emails() {
        for email in ["", "alice", "@example.com", "alice@", "alice@example", "a@b@c.com", "a b@c.com"] {
            assert!(
                request("alice", email, "secret1").validate().is_err(),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn login_accepts_username_alias() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"username":"alice","password":"pw"}"#).unwrap();
        assert_eq!(req.identifier, "alice");
    }
}
