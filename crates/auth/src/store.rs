//! Credential store contract.
//!
//! The relational store is an external collaborator; this trait is the
//! interface the auth layer consumes. Implementations live in the store
//! crate (in-memory and Postgres).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pipecrm_core::{StoreError, UserId};

use crate::roles::Role;

/// A persisted user account.
///
/// `password_hash` is the only credential material ever stored; accounts are
/// never deleted in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// A freshly signed-up account: least-privileged role, no display name.
    pub fn signup(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            name: None,
            password_hash: password_hash.into(),
            role: Role::Member,
            created_at: Utc::now(),
        }
    }
}

/// Partial update applied to an existing account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPatch {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

impl CredentialPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none()
    }
}

/// Persistence contract for user accounts, keyed by unique email.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a new account; `StoreError::Duplicate` if the email exists.
    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError>;

    /// Apply a partial update to the account with the given email.
    async fn update(&self, email: &str, patch: CredentialPatch)
        -> Result<UserRecord, StoreError>;
}
