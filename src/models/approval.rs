use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

/// Organizational level required to approve a request of a given value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    strum::Display,
    strum::EnumString,
)]
pub enum ApprovalTier {
    /// Values up to the management ceiling.
    Management,
    /// Values above the management ceiling, up to the executive ceiling.
    Executive,
    /// Values above the executive ceiling.
    Special,
}

/// Outcome of an approval review.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

/// A recorded approval decision. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    /// Who decided.
    pub approver: String,

    /// Tier the approver acted under.
    pub tier: ApprovalTier,

    pub decision: ApprovalDecision,

    pub decided_at: DateTime<Utc>,

    /// Reasoning behind the decision.
    pub justification: Option<String>,
}

impl fmt::Display for ApprovalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} ({})", self.decision, self.approver, self.tier)
    }
}
