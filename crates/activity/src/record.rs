//! Activity records and their derivation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pipecrm_core::ActivityId;
use pipecrm_deals::Deal;
use pipecrm_leads::Lead;

/// Closed set of auditable mutations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    LeadCreated,
    LeadUpdated,
    DealCreated,
    DealUpdated,
    DealWon,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::LeadCreated => "lead_created",
            ActivityKind::LeadUpdated => "lead_updated",
            ActivityKind::DealCreated => "deal_created",
            ActivityKind::DealUpdated => "deal_updated",
            ActivityKind::DealWon => "deal_won",
        }
    }
}

/// Immutable audit entry describing a business-entity mutation.
///
/// Append-only: never mutated, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub user_email: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    pub amount: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    fn new(user_email: &str, kind: ActivityKind, message: String, amount: Option<f64>) -> Self {
        Self {
            id: ActivityId::new(),
            user_email: user_email.to_string(),
            kind,
            message,
            amount,
            created_at: Utc::now(),
        }
    }

    pub fn lead_created(user_email: &str, lead: &Lead) -> Self {
        Self::new(
            user_email,
            ActivityKind::LeadCreated,
            format!("New lead created: {} {}", lead.first_name, lead.last_name),
            None,
        )
    }

    pub fn lead_updated(user_email: &str, lead: &Lead) -> Self {
        Self::new(
            user_email,
            ActivityKind::LeadUpdated,
            format!("Lead updated: {} {}", lead.first_name, lead.last_name),
            None,
        )
    }

    pub fn deal_created(user_email: &str, deal: &Deal) -> Self {
        Self::new(
            user_email,
            ActivityKind::DealCreated,
            format!("New deal created worth {}", deal.value),
            Some(deal.value),
        )
    }

    /// Derivation for a deal update: the distinguished `deal_won` record
    /// (with amount) when the updated deal sits in the won stage, a generic
    /// `deal_updated` (without amount) otherwise.
    pub fn deal_updated(user_email: &str, deal: &Deal) -> Self {
        if deal.stage.is_won() {
            Self::new(
                user_email,
                ActivityKind::DealWon,
                format!("Deal closed won worth {}", deal.value),
                Some(deal.value),
            )
        } else {
            Self::new(
                user_email,
                ActivityKind::DealUpdated,
                format!("Deal updated worth {}", deal.value),
                None,
            )
        }
    }
}
