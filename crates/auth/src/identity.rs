//! Request-scoped authenticated identity.

use crate::roles::Role;
use crate::token::Claims;

/// The authenticated `{email, role}` pair resolved from a bearer token.
///
/// Owned by the request lifecycle: produced by the gateway during identity
/// resolution, carried in request extensions, discarded afterwards. Never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            role: claims.role,
        }
    }
}
