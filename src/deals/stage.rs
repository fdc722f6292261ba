use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::error::CrmError;

/// Position of a deal in the sales pipeline.
///
/// `ClosedLost` has no board column: the UI never offers it, and it can only
/// be reached through a direct update. Analytics still account for it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DealStage {
    Lead,
    Qualified,
    Proposal,
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

/// Board stages in funnel order.
pub const CANONICAL_STAGES: [DealStage; 4] = [
    DealStage::Lead,
    DealStage::Qualified,
    DealStage::Proposal,
    DealStage::ClosedWon,
];

impl DealStage {
    /// Default win probability for a stage.
    ///
    /// `Closed Lost` was never part of the probability table and falls back
    /// to 25 like any other off-table stage; existing clients rely on that.
    pub fn default_probability(self) -> i32 {
        match self {
            Self::Lead => 25,
            Self::Qualified => 50,
            Self::Proposal => 75,
            Self::ClosedWon => 100,
            Self::ClosedLost => 25,
        }
    }

    /// True for the four stages that have a pipeline board column.
    pub fn is_canonical(self) -> bool {
        !matches!(self, Self::ClosedLost)
    }

    /// True once a deal has left the pipeline, won or lost.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lead => write!(f, "Lead"),
            Self::Qualified => write!(f, "Qualified"),
            Self::Proposal => write!(f, "Proposal"),
            Self::ClosedWon => write!(f, "Closed Won"),
            Self::ClosedLost => write!(f, "Closed Lost"),
        }
    }
}

impl FromStr for DealStage {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Lead" => Ok(Self::Lead),
            "Qualified" => Ok(Self::Qualified),
            "Proposal" => Ok(Self::Proposal),
            "Closed Won" => Ok(Self::ClosedWon),
            "Closed Lost" => Ok(Self::ClosedLost),
            other => Err(CrmError::InvalidStage(other.to_string())),
        }
    }
}
