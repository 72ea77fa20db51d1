//! JWT token generation and verification.
//!
//! Tokens are compact JWTs (`header.claims.signature`, base64url) signed with
//! HS512 under a single symmetric key. Validation takes `now` explicitly so the
//! expiry window is checked against the caller's clock.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{RngCore, rng};
use tracing::{info, warn};

use super::{AuthError, TokenError};
use crate::models::auth::{AuthenticatedPrincipal, IssuedToken, Role, TokenClaims};

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Minimum HS512 key length in bytes.
pub const MIN_KEY_LEN: usize = 64;

const ALGORITHM: Algorithm = Algorithm::HS512;

/// Symmetric signing key. Never printed.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Decode a standard-base64 secret. The decoded key must be at least 64 bytes.
    pub fn from_base64(secret: &str) -> Result<Self, AuthError> {
        let bytes = STANDARD
            .decode(secret.trim())
            .map_err(|_| AuthError::Internal("signing secret is not valid base64".into()))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, AuthError> {
        if bytes.len() < MIN_KEY_LEN {
            return Err(AuthError::Internal(format!(
                "signing key must be at least {MIN_KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Generate a random 64-byte key.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; MIN_KEY_LEN];
        rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Standard-base64 form, as accepted by [`SigningKey::from_base64`].
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Issues and validates access tokens under one key with a fixed TTL.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(key: &SigningKey, ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against the caller-supplied clock in `validate`.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding_key: EncodingKey::from_secret(&key.0),
            decoding_key: DecodingKey::from_secret(&key.0),
            validation,
            ttl,
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `subject` carrying `roles`, valid from `now` for the TTL.
    pub fn issue(
        &self,
        subject: &str,
        roles: &BTreeSet<Role>,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let iat = now.timestamp();
        let exp = iat + self.ttl.num_seconds();
        let claims = TokenClaims {
            sub: subject.to_string(),
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
            iat,
            exp,
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(format!("jwt encode: {e}")))?;
        Ok(IssuedToken {
            token,
            issued_at: timestamp(iat).ok_or_else(|| TokenError::Encode("iat out of range".into()))?,
            expires_at: timestamp(exp).ok_or_else(|| TokenError::Encode("exp out of range".into()))?,
        })
    }

    /// Verify signature, structure and validity window, returning the principal.
    pub fn validate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedPrincipal, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?
            .claims;

        // Claims carry whole seconds, so the window is [floor(t0), floor(t0) + ttl)
        // and `now` is truncated the same way before comparing.
        let now = now.timestamp();
        if now >= claims.exp || now < claims.iat {
            return Err(TokenError::Expired);
        }

        let roles = claims
            .roles
            .iter()
            .map(|name| name.parse::<Role>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|_| TokenError::Malformed)?;

        Ok(AuthenticatedPrincipal {
            subject: claims.sub,
            roles,
            issued_at: timestamp(claims.iat).ok_or(TokenError::Malformed)?,
            expires_at: timestamp(claims.exp).ok_or(TokenError::Malformed)?,
        })
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

/// Resolve the JWT secret: env var `JWT_SECRET` → persisted file → generated.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    load_or_generate_secret(&jwt_secret_path())
}

/// Read a persisted base64 secret from `path`, generating and writing one if absent.
pub fn load_or_generate_secret(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret = SigningKey::generate().to_base64();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::write(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new JWT secret"),
        Err(e) => warn!(path = %path.display(), error = %e, "could not persist JWT secret"),
    }
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatauth")
        .join("jwt-secret")
}
