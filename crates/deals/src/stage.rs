//! Deal stage: a closed set with case-insensitive parsing.
//!
//! The pipeline stage drives the audit protocol: an update that lands on
//! [`DealStage::Won`] produces a distinguished `deal_won` record. Parsing is
//! case-insensitive so "Won", "won" and "WON" are the same stage.

use core::str::FromStr;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use pipecrm_core::DomainError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DealStage {
    New,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl DealStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::New => "new",
            DealStage::Qualified => "qualified",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::Won => "won",
            DealStage::Lost => "lost",
        }
    }

    pub fn is_won(&self) -> bool {
        matches!(self, DealStage::Won)
    }
}

impl core::fmt::Display for DealStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealStage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(DealStage::New),
            "qualified" => Ok(DealStage::Qualified),
            "proposal" => Ok(DealStage::Proposal),
            "negotiation" => Ok(DealStage::Negotiation),
            "won" => Ok(DealStage::Won),
            "lost" => Ok(DealStage::Lost),
            other => Err(DomainError::validation(format!("unknown deal stage: {other}"))),
        }
    }
}

// Serde goes through FromStr so that JSON bodies keep the case-insensitive
// semantics ("Won" deserializes to the same variant as "won").
impl Serialize for DealStage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DealStage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
