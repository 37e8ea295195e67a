//! Domain events emitted by the engine and the audit-sink contract.
//!
//! The engine performs no I/O: every mutating operation returns the events
//! it produced and the caller forwards them, in order, to whatever
//! append-only log it wires in. Audit delivery is best-effort; a sink
//! failure never rolls back the business state that produced the event.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::models::approval::{ApprovalDecision, ApprovalTier};
use crate::models::request::{Department, Priority, Stage};

// Define the various events that can occur over a request's life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A new request entered the workflow.
    RequestOpened {
        request_number: i64,
        requester: String,
        department: Department,
        priority: Priority,
        sla_target_days: i64,
        timestamp: DateTime<Utc>,
    },

    /// A request moved along one edge of the legal-transition table.
    StageChanged {
        request_number: i64,
        from_stage: Stage,
        to_stage: Stage,
        actor: String,
        timestamp: DateTime<Utc>,
        note: Option<String>,
    },

    /// A supplier quote was entered during the quotation stage.
    QuoteAdded {
        request_number: i64,
        quote_id: Uuid,
        supplier: String,
        total: Decimal,
        timestamp: DateTime<Utc>,
    },

    /// A quote was chosen as the winner.
    QuoteSelected {
        request_number: i64,
        quote_id: Uuid,
        supplier: String,
        total: Decimal,
        justification: String,
        timestamp: DateTime<Utc>,
    },

    /// An approval decision was recorded.
    ApprovalRecorded {
        request_number: i64,
        approver: String,
        tier: ApprovalTier,
        decision: ApprovalDecision,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    /// The request this event belongs to.
    pub fn request_number(&self) -> i64 {
        match self {
            Event::RequestOpened { request_number, .. }
            | Event::StageChanged { request_number, .. }
            | Event::QuoteAdded { request_number, .. }
            | Event::QuoteSelected { request_number, .. }
            | Event::ApprovalRecorded { request_number, .. } => *request_number,
        }
    }
}

/// Append-only audit log the caller wires in.
pub trait AuditSink {
    /// Records one event. Errors are reported as plain messages; the
    /// dispatcher logs and drops them.
    fn record(&mut self, event: &Event) -> Result<(), String>;
}

/// Forwards a batch of events to the sink in order. Delivery failures are
/// logged and swallowed: audit is not transactional with business state.
pub fn dispatch(sink: &mut dyn AuditSink, events: &[Event]) {
    for event in events {
        if let Err(err) = sink.record(event) {
            warn!(
                request_number = event.request_number(),
                "audit sink rejected event: {}", err
            );
        }
    }
}

/// In-memory sink, useful in tests and as a reference implementation.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    pub events: Vec<Event>,
}

impl AuditSink for MemoryAuditSink {
    fn record(&mut self, event: &Event) -> Result<(), String> {
        self.events.push(event.clone());
        Ok(())
    }
}
