//! Show identity and lifecycle status.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ShowId(pub u64);

impl fmt::Display for ShowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ShowId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Tagged state of a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShowStatus {
    #[default]
    Unassigned,
    InDesign,
    PendingApproval,
    Approved,
    Archived,
}

impl ShowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::InDesign => "in_design",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for ShowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
