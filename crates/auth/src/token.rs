//! Signed, expiring bearer tokens (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roles::Role;

/// Claim set carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account email.
    pub sub: String,
    /// Role granted at issuance.
    pub role: Role,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds). A token is valid iff the signature verifies
    /// and the current time is before this instant.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("failed to sign token")]
    Sign,

    /// Single collapsed outcome for every verification failure (bad
    /// signature, expired, malformed, unknown role). Callers must not be
    /// able to distinguish the reasons.
    #[error("invalid token")]
    Invalid,
}

/// Issues and verifies compact signed tokens.
///
/// The signing secret is an explicit constructor input, loaded once at
/// startup and passed down; nothing in this crate reads ambient state.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Fixed validity window for issued tokens.
    pub const DEFAULT_TTL_HOURS: i64 = 24;

    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(Self::DEFAULT_TTL_HOURS))
    }

    /// Construct with an explicit validity window. Used by tests to mint
    /// already-expired tokens.
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a token for `email` with the given role, expiring `ttl` from now.
    pub fn issue(&self, email: &str, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|_| TokenError::Sign)
    }

    /// Verify signature and expiry; return the claims or [`TokenError::Invalid`].
    ///
    /// Never returns partial claims: any failure yields the same error.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}
