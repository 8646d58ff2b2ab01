//! `pipecrm-deals` — deal model, stage lifecycle and persistence contract.

pub mod deal;
pub mod stage;
pub mod store;

pub use deal::{Deal, DealPatch, NewDeal};
pub use stage::DealStage;
pub use store::DealStore;
