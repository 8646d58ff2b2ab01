//! Role model used for coarse authorization checks.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use pipecrm_core::DomainError;

/// Role granted to a user account and embedded in issued tokens.
///
/// Closed set on purpose: a token carrying an unknown role fails
/// verification instead of smuggling an unchecked string through the
/// authorization layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Member => "member",
        }
    }

    /// Campaign dispatch is restricted to admins and managers.
    pub fn can_send_campaigns(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Member
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "member" => Ok(Role::Member),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}
