//! Lead entity and its create/update shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pipecrm_core::LeadId;

/// A sales lead, owned by the user identified by `owner_email`.
///
/// Ownership scoping: every read and mutation of a lead is filtered by the
/// requester's email; a lead owned by someone else behaves as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub owner_email: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    /// Free-form pipeline status; "lost" (case-insensitive) marks a lead
    /// inactive for dashboard purposes.
    pub status: Option<String>,
    pub notes: Option<String>,
    pub created: DateTime<Utc>,
}

impl Lead {
    /// Materialize a new lead for `owner_email` at the current time.
    pub fn create(owner_email: impl Into<String>, new: NewLead) -> Self {
        Self {
            id: LeadId::new(),
            owner_email: owner_email.into(),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            company: new.company,
            phone: new.phone,
            source: new.source,
            status: new.status,
            notes: new.notes,
            created: Utc::now(),
        }
    }

    /// Apply a partial update in place. `None` fields are left untouched.
    pub fn apply(&mut self, patch: &LeadPatch) {
        if let Some(v) = &patch.first_name {
            self.first_name = v.clone();
        }
        if let Some(v) = &patch.last_name {
            self.last_name = v.clone();
        }
        if let Some(v) = &patch.email {
            self.email = Some(v.clone());
        }
        if let Some(v) = &patch.company {
            self.company = Some(v.clone());
        }
        if let Some(v) = &patch.phone {
            self.phone = Some(v.clone());
        }
        if let Some(v) = &patch.source {
            self.source = Some(v.clone());
        }
        if let Some(v) = &patch.status {
            self.status = Some(v.clone());
        }
        if let Some(v) = &patch.notes {
            self.notes = Some(v.clone());
        }
    }

    /// Whether this lead counts as active: a status is set and it is not
    /// "lost" in any casing.
    pub fn is_active(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| !s.eq_ignore_ascii_case("lost"))
    }
}

/// Payload for creating a lead. The owner is taken from the request
/// identity, never from the body.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Named-field partial update. Unknown keys are rejected rather than
/// silently written through to storage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeadPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl LeadPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.company.is_none()
            && self.phone.is_none()
            && self.source.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }
}
