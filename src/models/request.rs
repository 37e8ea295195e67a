use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;
use validator::Validate;

use crate::models::approval::{ApprovalRecord, ApprovalTier};
use crate::models::quote::QuoteRecord;
use crate::models::transition::StageTransition;

/// Enum representing the eleven stages of the procurement workflow.
///
/// `Rejected` and `OrderCompleted` are terminal; a request that reaches
/// either of them never changes stage again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::EnumString,
)]
pub enum Stage {
    Request,
    Requisition,
    Procurement,
    InQuotation,
    PurchaseOrder,
    AwaitingApproval,
    Approved,
    Rejected,
    PurchaseMade,
    AwaitingDelivery,
    OrderCompleted,
}

impl Stage {
    /// Returns true for the two stages with no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Rejected | Stage::OrderCompleted)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Request => write!(f, "Request"),
            Stage::Requisition => write!(f, "Requisition"),
            Stage::Procurement => write!(f, "Procurement"),
            Stage::InQuotation => write!(f, "In Quotation"),
            Stage::PurchaseOrder => write!(f, "Purchase Order"),
            Stage::AwaitingApproval => write!(f, "Awaiting Approval"),
            Stage::Approved => write!(f, "Approved"),
            Stage::Rejected => write!(f, "Rejected"),
            Stage::PurchaseMade => write!(f, "Purchase Made"),
            Stage::AwaitingDelivery => write!(f, "Awaiting Delivery"),
            Stage::OrderCompleted => write!(f, "Order Completed"),
        }
    }
}

/// Enum representing the priority of a purchase request.
///
/// Priority drives the SLA target assigned at creation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    strum::Display,
    strum::EnumString,
)]
pub enum Priority {
    Urgent,
    High,
    Normal,
    Low,
}

/// Enum representing the requesting department.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::EnumString,
)]
pub enum Department {
    Maintenance,
    #[serde(rename = "IT")]
    #[strum(serialize = "IT")]
    InformationTechnology,
    #[serde(rename = "HR")]
    #[strum(serialize = "HR")]
    HumanResources,
    Finance,
    Marketing,
    Operations,
    Other,
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Department::Maintenance => write!(f, "Maintenance"),
            Department::InformationTechnology => write!(f, "IT"),
            Department::HumanResources => write!(f, "HR"),
            Department::Finance => write!(f, "Finance"),
            Department::Marketing => write!(f, "Marketing"),
            Department::Operations => write!(f, "Operations"),
            Department::Other => write!(f, "Other"),
        }
    }
}

/// A single requested line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LineItem {
    /// Catalog code, free-form.
    pub code: String,

    /// What is being requested.
    #[validate(length(min = 1))]
    pub description: String,

    /// Requested quantity, at least one.
    #[validate(range(min = 1))]
    pub quantity: u32,

    /// Unit of measure (e.g. "UN", "BOX", "KG").
    pub unit: String,
}

/// The purchase request aggregate root.
///
/// Mutated exclusively through the lifecycle and quotation services; callers
/// load it fully materialized, invoke operations, and persist the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    /// Sequential request number, unique and monotonically assigned.
    pub request_number: i64,

    /// Name of the employee who opened the request.
    pub requester: String,

    /// Requesting department.
    pub department: Department,

    /// Priority, fixed at creation.
    pub priority: Priority,

    /// Free-text description of the need.
    pub description: String,

    /// Where the purchased goods will be applied.
    pub application_site: String,

    /// Value estimated by the requester, if any.
    pub estimated_value: Option<Decimal>,

    /// Value actually paid; set only once the purchase is made.
    pub final_value: Option<Decimal>,

    /// Supplier recommended by the winning quote.
    pub recommended_supplier: Option<String>,

    /// Total of the winning quote, captured at selection time.
    pub recommended_value: Option<Decimal>,

    /// Supplier the purchase was placed with.
    pub final_supplier: Option<String>,

    /// Internal requisition number assigned by the stock team.
    pub requisition_number: Option<i64>,

    /// Stock handler who converted the request into a requisition.
    pub stock_handler: Option<String>,

    /// Creation timestamp; start of the SLA clock.
    pub created_at: DateTime<Utc>,

    /// Timestamp of entry into a terminal stage; end of the SLA clock.
    pub completed_at: Option<DateTime<Utc>>,

    /// SLA target in business days, frozen at creation and never recomputed.
    pub sla_target_days: i64,

    /// Approver tier required for this request's value, stored on entry to
    /// the approval stage.
    pub required_tier: Option<ApprovalTier>,

    /// Current stage of the workflow.
    pub stage: Stage,

    /// Requested line items.
    pub items: Vec<LineItem>,

    /// Supplier quotes collected during the quotation stage.
    pub quotes: Vec<QuoteRecord>,

    /// Approval decisions, appended when the approval stage resolves.
    pub approvals: Vec<ApprovalRecord>,

    /// Append-only stage history: the opening entry plus one per transition.
    pub history: Vec<StageTransition>,
}

impl PurchaseRequest {
    /// The monetary value approval routing is based on: the final value once
    /// known, otherwise the requester's estimate.
    pub fn current_value(&self) -> Option<Decimal> {
        self.final_value.or(self.estimated_value)
    }

    /// The quote currently marked as selected, if any.
    pub fn selected_quote(&self) -> Option<&QuoteRecord> {
        self.quotes.iter().find(|q| q.is_selected())
    }

    /// True once the request has reached a terminal stage.
    pub fn is_closed(&self) -> bool {
        self.stage.is_terminal()
    }

    /// End of the SLA clock: the terminal-stage timestamp for closed
    /// requests, `now` for open ones.
    pub fn sla_clock_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.completed_at.unwrap_or(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn only_two_stages_are_terminal() {
        let terminal: Vec<Stage> = Stage::iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![Stage::Rejected, Stage::OrderCompleted]);
    }

    #[test]
    fn stage_display_uses_workflow_names() {
        assert_eq!(Stage::InQuotation.to_string(), "In Quotation");
        assert_eq!(Stage::AwaitingApproval.to_string(), "Awaiting Approval");
        assert_eq!(Stage::OrderCompleted.to_string(), "Order Completed");
    }

    #[test]
    fn line_item_requires_description_and_quantity() {
        let item = LineItem {
            code: "MAT-001".to_string(),
            description: String::new(),
            quantity: 0,
            unit: "UN".to_string(),
        };
        assert!(item.validate().is_err());
    }
}
