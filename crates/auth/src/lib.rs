//! `pipecrm-auth` — authentication and authorization boundary.
//!
//! Password hashing, signed bearer tokens, and the gateway that turns the
//! two into a request-scoped [`Identity`]. Storage is behind the
//! [`CredentialStore`] trait; HTTP concerns live in the api crate.

pub mod gateway;
pub mod identity;
pub mod password;
pub mod roles;
pub mod store;
pub mod token;

pub use gateway::{AuthError, AuthGateway, LoginGrant, Profile, ProfileUpdate};
pub use identity::Identity;
pub use password::PasswordHasher;
pub use roles::Role;
pub use store::{CredentialPatch, CredentialStore, UserRecord};
pub use token::{Claims, TokenError, TokenService};
