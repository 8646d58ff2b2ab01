//! Deal entity and its create/update shapes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pipecrm_core::{DealId, UserId};

use crate::stage::DealStage;

/// A deal in the pipeline.
///
/// `owner_id` is resolved from the creating identity at write time and must
/// refer to an existing user. Ownership is enforced on every operation,
/// reads included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub owner_id: UserId,
    pub title: String,
    pub stage: DealStage,
    pub value: f64,
    pub close_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Deal {
    /// Materialize a new deal owned by `owner_id` at the current time.
    pub fn create(owner_id: UserId, new: NewDeal) -> Self {
        Self {
            id: DealId::new(),
            owner_id,
            title: new.title,
            stage: new.stage.unwrap_or(DealStage::New),
            value: new.value,
            close_date: new.close_date,
            created_at: Utc::now(),
        }
    }

    /// Apply a partial update in place. `None` fields are left untouched.
    pub fn apply(&mut self, patch: &DealPatch) {
        if let Some(v) = &patch.title {
            self.title = v.clone();
        }
        if let Some(v) = patch.stage {
            self.stage = v;
        }
        if let Some(v) = patch.value {
            self.value = v;
        }
        if let Some(v) = patch.close_date {
            self.close_date = Some(v);
        }
    }
}

/// Payload for creating a deal. The owner is resolved from the request
/// identity, never taken from the body.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewDeal {
    pub title: String,
    pub value: f64,
    pub stage: Option<DealStage>,
    pub close_date: Option<NaiveDate>,
}

/// Named-field partial update; unknown keys are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DealPatch {
    pub title: Option<String>,
    pub stage: Option<DealStage>,
    pub value: Option<f64>,
    pub close_date: Option<NaiveDate>,
}

impl DealPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.stage.is_none()
            && self.value.is_none()
            && self.close_date.is_none()
    }
}
