//! Value-based approval routing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::approval::ApprovalTier;

/// Immutable approval-ceiling snapshot.
///
/// Boundaries are inclusive to the lower tier: a value exactly equal to a
/// ceiling belongs to that ceiling's tier. All comparisons are fixed-point;
/// no floats anywhere near money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    management_ceiling: Decimal,
    executive_ceiling: Decimal,
}

impl ApprovalPolicy {
    /// Builds a policy, rejecting a management ceiling at or above the
    /// executive one.
    pub fn new(
        management_ceiling: Decimal,
        executive_ceiling: Decimal,
    ) -> Result<Self, EngineError> {
        if management_ceiling >= executive_ceiling {
            return Err(EngineError::InvalidPolicyConfig {
                management: management_ceiling,
                executive: executive_ceiling,
            });
        }
        Ok(Self {
            management_ceiling,
            executive_ceiling,
        })
    }

    /// The tier whose sign-off a purchase of `value` requires.
    pub fn required_tier(&self, value: Decimal) -> ApprovalTier {
        if value <= self.management_ceiling {
            ApprovalTier::Management
        } else if value <= self.executive_ceiling {
            ApprovalTier::Executive
        } else {
            ApprovalTier::Special
        }
    }

    pub fn management_ceiling(&self) -> Decimal {
        self.management_ceiling
    }

    pub fn executive_ceiling(&self) -> Decimal {
        self.executive_ceiling
    }
}
