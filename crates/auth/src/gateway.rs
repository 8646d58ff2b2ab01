//! Auth gateway: signup/login/profile plus identity resolution.
//!
//! Orchestrates the credential store, password hasher and token service.
//! Identity resolution is a pure function of the presented token with
//! exactly two terminal outcomes: an [`Identity`] or [`AuthError::Unauthorized`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pipecrm_core::StoreError;

use crate::identity::Identity;
use crate::password::PasswordHasher;
use crate::roles::Role;
use crate::store::{CredentialPatch, CredentialStore, UserRecord};
use crate::token::TokenService;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Signup with an email that is already registered.
    #[error("user already exists")]
    EmailTaken,

    /// Login failure. Deliberately identical for "no such user" and "wrong
    /// password" so the endpoint cannot be used as an enumeration oracle.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Identity resolution failure. Missing header, malformed token, bad
    /// signature and expiry all collapse here.
    #[error("invalid or missing token")]
    Unauthorized,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage error")]
    Store(#[from] StoreError),
}

/// Successful login: the bearer token plus the role it embeds.
#[derive(Debug, Clone, Serialize)]
pub struct LoginGrant {
    pub access_token: String,
    pub token_type: &'static str,
    pub role: Role,
}

/// Public profile projection of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub name: Option<String>,
    pub email: String,
}

/// Partial profile update. Unknown keys are rejected at the DTO boundary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

pub struct AuthGateway {
    users: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl AuthGateway {
    pub fn new(users: Arc<dyn CredentialStore>, tokens: TokenService) -> Self {
        Self {
            users,
            hasher: PasswordHasher::new(),
            tokens,
        }
    }

    /// Register a new account. The password is hashed before it reaches the
    /// store; the plaintext is dropped here.
    pub async fn signup(&self, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("password must not be empty".into()));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let hash = self
            .hasher
            .hash(password)
            .map_err(|_| AuthError::Validation("password could not be processed".into()))?;

        match self.users.insert(UserRecord::signup(email, hash)).await {
            Ok(user) => Ok(user),
            // Lost a race with a concurrent signup for the same email.
            Err(StoreError::Duplicate(_)) => Err(AuthError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials and issue a bearer token embedding the role.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, AuthError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self
            .tokens
            .issue(&user.email, user.role)
            .map_err(|_| AuthError::InvalidCredentials)?;

        Ok(LoginGrant {
            access_token,
            token_type: "bearer",
            role: user.role,
        })
    }

    /// Resolve the request identity from an `Authorization` header value.
    ///
    /// Tolerates a missing or present "Bearer" prefix and surrounding
    /// whitespace. Every failure collapses to [`AuthError::Unauthorized`].
    pub fn resolve_identity(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        let header = authorization.ok_or(AuthError::Unauthorized)?;
        let token = extract_bearer(header).ok_or(AuthError::Unauthorized)?;
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::Unauthorized)?;
        Ok(Identity::from(claims))
    }

    /// `{name, email}` for the authenticated account.
    pub async fn profile(&self, identity: &Identity) -> Result<Profile, AuthError> {
        let user = self
            .users
            .find_by_email(&identity.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        Ok(Profile {
            name: user.name,
            email: user.email,
        })
    }

    /// Partial profile update; a supplied password is re-hashed. Rejects an
    /// update with nothing to apply.
    pub async fn update_profile(
        &self,
        identity: &Identity,
        update: ProfileUpdate,
    ) -> Result<Profile, AuthError> {
        let mut patch = CredentialPatch {
            name: update.name.filter(|n| !n.trim().is_empty()),
            password_hash: None,
        };

        if let Some(password) = update.password.filter(|p| !p.is_empty()) {
            let hash = self
                .hasher
                .hash(&password)
                .map_err(|_| AuthError::Validation("password could not be processed".into()))?;
            patch.password_hash = Some(hash);
        }

        if patch.is_empty() {
            return Err(AuthError::Validation("nothing to update".into()));
        }

        let user = match self.users.update(&identity.email, patch).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(AuthError::Unauthorized),
            Err(e) => return Err(e.into()),
        };

        Ok(Profile {
            name: user.name,
            email: user.email,
        })
    }

    /// Look up the stable account id behind an identity (deal ownership is
    /// keyed by user id, not email).
    pub async fn user_id(&self, identity: &Identity) -> Result<pipecrm_core::UserId, AuthError> {
        let user = self
            .users
            .find_by_email(&identity.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        Ok(user.id)
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::Validation("a valid email is required".into()));
    }
    Ok(email.to_ascii_lowercase())
}

/// Pull the token out of an `Authorization` header value.
///
/// Accepts `"Bearer <token>"` and a bare `"<token>"`, with any amount of
/// surrounding whitespace.
fn extract_bearer(header: &str) -> Option<&str> {
    let rest = header.trim();
    let rest = rest.strip_prefix("Bearer").unwrap_or(rest);
    let token = rest.split_whitespace().next()?;
    (!token.is_empty()).then_some(token)
}
