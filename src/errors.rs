use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::models::request::Stage;

/// Recoverable, caller-facing errors returned by the engine.
///
/// No operation mutates the aggregate when it returns an error: every
/// invariant check runs before the first write, so a failed call leaves the
/// request exactly as it was loaded.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The requested stage change is not an edge of the legal-transition
    /// table. Multi-step jumps are always rejected, regardless of actor.
    #[error("illegal transition from '{from}' to '{to}'")]
    IllegalTransition { from: Stage, to: Stage },

    /// The request already reached a terminal stage.
    #[error("request #{request_number} is closed in stage '{stage}' and cannot move")]
    TerminalState { request_number: i64, stage: Stage },

    /// Approval routing needs a monetary value but the request has neither
    /// a final nor an estimated one.
    #[error("request #{request_number} has no final or estimated value to route approval by")]
    MissingValue { request_number: i64 },

    /// Leaving the quotation stage requires a selected, justified quote.
    #[error("request #{request_number} has no selected quote with justification")]
    NoQuoteSelected { request_number: i64 },

    /// A quote cannot be selected without saying why.
    #[error("quote selection for request #{request_number} requires a justification")]
    MissingJustification { request_number: i64 },

    /// The same supplier already has a non-rejected quote on this request.
    #[error("supplier '{supplier}' already has an active quote on request #{request_number}")]
    DuplicateSupplier {
        request_number: i64,
        supplier: String,
    },

    /// Approval ceilings are misconfigured.
    #[error(
        "invalid approval policy: management ceiling {management} must be \
         below executive ceiling {executive}"
    )]
    InvalidPolicyConfig {
        management: Decimal,
        executive: Decimal,
    },

    /// Quote entry, selection, and rejection only happen while the request
    /// sits in the quotation stage.
    #[error(
        "request #{request_number} is in stage '{stage}'; quote changes are \
         only allowed during quotation"
    )]
    QuotationNotOpen { request_number: i64, stage: Stage },

    /// The referenced quote does not exist on this request.
    #[error("quote {quote_id} not found on request #{request_number}")]
    QuoteNotFound {
        request_number: i64,
        quote_id: Uuid,
    },

    /// Entering `Approved` or `Rejected` requires the caller to supply the
    /// decision record.
    #[error("transition to '{target}' requires an approval decision record")]
    MissingApprovalRecord { target: Stage },

    /// The supplied approval decision contradicts the target stage.
    #[error("approval decision '{decision}' does not match target stage '{target}'")]
    ApprovalDecisionMismatch { decision: String, target: Stage },

    /// Input payload failed field validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),
}
