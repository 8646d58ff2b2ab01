//! `pipecrm-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod page;

pub use error::{DomainError, DomainResult, StoreError};
pub use id::{ActivityId, DealId, LeadId, UserId};
pub use page::Page;
