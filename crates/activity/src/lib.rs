//! `pipecrm-activity` — the append-only audit trail.
//!
//! Every successful lead/deal mutation derives one [`ActivityRecord`].
//! The derivation rules are fixed; the append itself is best-effort
//! relative to the business write (see [`ActivityRecorder`]).

pub mod record;
pub mod recorder;
pub mod store;

pub use record::{ActivityKind, ActivityRecord};
pub use recorder::ActivityRecorder;
pub use store::ActivityStore;
