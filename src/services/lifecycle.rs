//! The request state machine.
//!
//! Holds the legal-transition table and every guard a stage change must
//! pass. Transitions are all-or-nothing: each check runs before the first
//! write, so a failed call returns the aggregate untouched. The engine
//! enforces only *legality* of a transition; who is allowed to invoke it is
//! the caller's concern.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, instrument};
use validator::{Validate, ValidationError};

use crate::errors::EngineError;
use crate::events::Event;
use crate::models::approval::{ApprovalDecision, ApprovalRecord, ApprovalTier};
use crate::models::request::{Department, LineItem, Priority, PurchaseRequest, Stage};
use crate::models::transition::StageTransition;
use crate::services::approval_policy::ApprovalPolicy;
use crate::services::sla::SlaPolicy;

/// Input payload for opening a request.
#[derive(Debug, Clone, Validate)]
pub struct NewRequest {
    #[validate(length(min = 1))]
    pub requester: String,

    pub department: Department,

    pub priority: Priority,

    #[validate(length(min = 1))]
    pub description: String,

    #[validate(length(min = 1))]
    pub application_site: String,

    #[validate(custom = "validate_non_negative")]
    pub estimated_value: Option<Decimal>,

    #[validate]
    pub items: Vec<LineItem>,
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative_value"));
    }
    Ok(())
}

/// The approval decision supplied when resolving the approval stage.
#[derive(Debug, Clone)]
pub struct ApprovalInput {
    pub approver: String,
    pub decision: ApprovalDecision,
    pub justification: Option<String>,
}

/// Requisition details captured when the stock team hands the request to
/// procurement.
#[derive(Debug, Clone)]
pub struct RequisitionInput {
    pub requisition_number: i64,
    pub stock_handler: String,
}

/// One requested stage change.
#[derive(Debug, Clone)]
pub struct AdvanceCommand {
    pub target: Stage,
    pub actor: String,
    pub note: Option<String>,
    /// Required when the target is `Approved` or `Rejected`.
    pub approval: Option<ApprovalInput>,
    /// Optionally captured when entering `Procurement`.
    pub requisition: Option<RequisitionInput>,
}

impl AdvanceCommand {
    pub fn new(target: Stage, actor: impl Into<String>) -> Self {
        Self {
            target,
            actor: actor.into(),
            note: None,
            approval: None,
            requisition: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_approval(mut self, approval: ApprovalInput) -> Self {
        self.approval = Some(approval);
        self
    }

    pub fn with_requisition(mut self, requisition: RequisitionInput) -> Self {
        self.requisition = Some(requisition);
        self
    }
}

/// True exactly for the edges of the legal-transition table. There are no
/// self-edges and no shortcuts, for any actor.
pub fn is_legal_transition(from: Stage, to: Stage) -> bool {
    match (from, to) {
        // Submission and stock handling
        (Stage::Request, Stage::Requisition) => true,
        (Stage::Requisition, Stage::Procurement) => true,

        // Procurement and quotation
        (Stage::Procurement, Stage::InQuotation) => true,
        (Stage::InQuotation, Stage::PurchaseOrder) => true,
        (Stage::PurchaseOrder, Stage::AwaitingApproval) => true,

        // Approval resolution
        (Stage::AwaitingApproval, Stage::Approved) => true,
        (Stage::AwaitingApproval, Stage::Rejected) => true,

        // Purchase and delivery
        (Stage::Approved, Stage::PurchaseMade) => true,
        (Stage::PurchaseMade, Stage::AwaitingDelivery) => true,
        (Stage::AwaitingDelivery, Stage::OrderCompleted) => true,

        // Everything else, including stays in place, is illegal
        _ => false,
    }
}

/// The procurement lifecycle engine.
///
/// Policies are read-only snapshots taken at construction; the engine never
/// mutates them and performs no I/O of its own.
#[derive(Debug, Clone)]
pub struct RequestLifecycle {
    sla: SlaPolicy,
    approval: ApprovalPolicy,
}

impl RequestLifecycle {
    pub fn new(sla: SlaPolicy, approval: ApprovalPolicy) -> Self {
        Self { sla, approval }
    }

    /// Opens a new request at the `Request` stage.
    ///
    /// The SLA target is frozen here from the policy snapshot and never
    /// recomputed, so later policy changes leave past requests untouched.
    /// The caller supplies the next sequential request number; assigning it
    /// monotonically is the persistence layer's job.
    #[instrument(skip(self, input))]
    pub fn open_at(
        &self,
        request_number: i64,
        input: NewRequest,
        now: DateTime<Utc>,
    ) -> Result<(PurchaseRequest, Vec<Event>), EngineError> {
        input.validate()?;

        let sla_target_days = self.sla.target_days(input.priority, input.department);
        // The aggregate alone must be able to answer when each stage was
        // entered, so creation writes the opening history entry itself.
        let opening = StageTransition {
            from_stage: None,
            to_stage: Stage::Request,
            actor: input.requester.clone(),
            occurred_at: now,
            note: None,
        };
        let request = PurchaseRequest {
            request_number,
            requester: input.requester,
            department: input.department,
            priority: input.priority,
            description: input.description,
            application_site: input.application_site,
            estimated_value: input.estimated_value,
            final_value: None,
            recommended_supplier: None,
            recommended_value: None,
            final_supplier: None,
            requisition_number: None,
            stock_handler: None,
            created_at: now,
            completed_at: None,
            sla_target_days,
            required_tier: None,
            stage: Stage::Request,
            items: input.items,
            quotes: Vec::new(),
            approvals: Vec::new(),
            history: vec![opening],
        };
        let events = vec![Event::RequestOpened {
            request_number,
            requester: request.requester.clone(),
            department: request.department,
            priority: request.priority,
            sla_target_days,
            timestamp: now,
        }];

        info!(
            "request #{} opened with SLA target of {} business days",
            request_number, sla_target_days
        );
        Ok((request, events))
    }

    pub fn open(
        &self,
        request_number: i64,
        input: NewRequest,
    ) -> Result<(PurchaseRequest, Vec<Event>), EngineError> {
        self.open_at(request_number, input, Utc::now())
    }

    /// Moves a request one stage forward (or to `Rejected`).
    ///
    /// On success exactly one `StageTransition` is appended and a
    /// `StageChanged` event is emitted for the caller to persist and
    /// forward to the audit trail.
    #[instrument(
        skip(self, request, command),
        fields(request_number = request.request_number, from = %request.stage, to = %command.target)
    )]
    pub fn advance_at(
        &self,
        request: &mut PurchaseRequest,
        command: AdvanceCommand,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, EngineError> {
        let from = request.stage;
        let target = command.target;

        if from.is_terminal() {
            error!(
                "request #{} is closed in stage '{}'",
                request.request_number, from
            );
            return Err(EngineError::TerminalState {
                request_number: request.request_number,
                stage: from,
            });
        }
        if !is_legal_transition(from, target) {
            error!(
                "illegal transition '{}' -> '{}' on request #{}",
                from, target, request.request_number
            );
            return Err(EngineError::IllegalTransition { from, to: target });
        }

        // Guards and derived data, all computed before the first mutation.
        let required_tier = if target == Stage::AwaitingApproval {
            let value =
                request
                    .current_value()
                    .ok_or(EngineError::MissingValue {
                        request_number: request.request_number,
                    })?;
            Some(self.approval.required_tier(value))
        } else {
            None
        };

        if target == Stage::PurchaseOrder {
            let justified = request
                .selected_quote()
                .and_then(|q| q.justification.as_deref())
                .map(|j| !j.trim().is_empty())
                .unwrap_or(false);
            if !justified {
                return Err(EngineError::NoQuoteSelected {
                    request_number: request.request_number,
                });
            }
        }

        let approval_record = if matches!(target, Stage::Approved | Stage::Rejected) {
            let input = command
                .approval
                .ok_or(EngineError::MissingApprovalRecord { target })?;
            let expected = match target {
                Stage::Approved => ApprovalDecision::Approved,
                _ => ApprovalDecision::Rejected,
            };
            if input.decision != expected {
                return Err(EngineError::ApprovalDecisionMismatch {
                    decision: input.decision.to_string(),
                    target,
                });
            }
            Some(ApprovalRecord {
                approver: input.approver,
                tier: self.resolve_tier(request)?,
                decision: input.decision,
                decided_at: now,
                justification: input.justification,
            })
        } else {
            None
        };

        let purchase_capture = if target == Stage::PurchaseMade {
            request
                .selected_quote()
                .map(|q| (q.total, q.supplier.clone()))
        } else {
            None
        };

        // All checks passed; mutate and collect events.
        let mut events = Vec::new();

        if target == Stage::Procurement {
            if let Some(requisition) = command.requisition {
                request.requisition_number = Some(requisition.requisition_number);
                request.stock_handler = Some(requisition.stock_handler);
            }
        }
        if let Some(tier) = required_tier {
            request.required_tier = Some(tier);
        }
        if let Some(record) = approval_record {
            events.push(Event::ApprovalRecorded {
                request_number: request.request_number,
                approver: record.approver.clone(),
                tier: record.tier,
                decision: record.decision,
                timestamp: now,
            });
            request.approvals.push(record);
        }
        if let Some((total, supplier)) = purchase_capture {
            request.final_value = Some(total);
            request.final_supplier = Some(supplier);
        }
        if target.is_terminal() {
            request.completed_at = Some(now);
        }

        request.history.push(StageTransition {
            from_stage: Some(from),
            to_stage: target,
            actor: command.actor.clone(),
            occurred_at: now,
            note: command.note.clone(),
        });
        request.stage = target;
        events.push(Event::StageChanged {
            request_number: request.request_number,
            from_stage: from,
            to_stage: target,
            actor: command.actor,
            timestamp: now,
            note: command.note,
        });

        info!(
            "request #{} moved from '{}' to '{}'",
            request.request_number, from, target
        );
        Ok(events)
    }

    pub fn advance(
        &self,
        request: &mut PurchaseRequest,
        command: AdvanceCommand,
    ) -> Result<Vec<Event>, EngineError> {
        self.advance_at(request, command, Utc::now())
    }

    /// Tier the pending decision must come from: the one stored on entry to
    /// the approval stage, or routed afresh from the request's value.
    fn resolve_tier(&self, request: &PurchaseRequest) -> Result<ApprovalTier, EngineError> {
        match request.required_tier {
            Some(tier) => Ok(tier),
            None => {
                let value =
                    request
                        .current_value()
                        .ok_or(EngineError::MissingValue {
                            request_number: request.request_number,
                        })?;
                Ok(self.approval.required_tier(value))
            }
        }
    }
}
