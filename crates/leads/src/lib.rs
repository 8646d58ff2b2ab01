//! `pipecrm-leads` — lead model, partial updates and listing queries.

pub mod lead;
pub mod query;
pub mod store;

pub use lead::{Lead, LeadPatch, NewLead};
pub use query::LeadQuery;
pub use store::LeadStore;
