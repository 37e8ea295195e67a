#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use procurement_engine::services::quotations;
use procurement_engine::{
    AdvanceCommand, ApprovalDecision, ApprovalInput, ApprovalPolicy, Department, NewRequest,
    Priority, PurchaseRequest, QuoteInput, RequestLifecycle, RequisitionInput, SlaPolicy, Stage,
};

/// Installs a test-writer subscriber so engine tracing shows up under
/// `--nocapture`. Safe to call from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Monday 2024-06-10, 09:00 UTC.
pub fn monday_9am() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap()
}

pub fn days_after(start: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    start + chrono::Duration::days(days)
}

pub fn engine() -> RequestLifecycle {
    RequestLifecycle::new(
        SlaPolicy::default(),
        ApprovalPolicy::new(dec!(5000.00), dec!(15000.00)).unwrap(),
    )
}

pub fn new_request(priority: Priority, estimated_value: Option<Decimal>) -> NewRequest {
    NewRequest {
        requester: "ana".to_string(),
        department: Department::Maintenance,
        priority,
        description: "replacement bearings for line 2".to_string(),
        application_site: "plant 2".to_string(),
        estimated_value,
        items: vec![],
    }
}

pub fn open_at(
    engine: &RequestLifecycle,
    priority: Priority,
    estimated_value: Option<Decimal>,
    now: DateTime<Utc>,
) -> PurchaseRequest {
    let (request, _events) = engine
        .open_at(1, new_request(priority, estimated_value), now)
        .unwrap();
    request
}

pub fn quote(supplier: &str, total: Decimal, lead_time_days: i64) -> QuoteInput {
    QuoteInput {
        supplier: supplier.to_string(),
        total,
        lead_time_days,
        payment_terms: Some("Net 30".to_string()),
        notes: None,
    }
}

/// Walks a request along the happy path until it reaches `target`,
/// supplying whatever each guard needs along the way.
pub fn drive_to(
    engine: &RequestLifecycle,
    request: &mut PurchaseRequest,
    target: Stage,
    now: DateTime<Utc>,
) {
    let path = [
        Stage::Requisition,
        Stage::Procurement,
        Stage::InQuotation,
        Stage::PurchaseOrder,
        Stage::AwaitingApproval,
        Stage::Approved,
        Stage::PurchaseMade,
        Stage::AwaitingDelivery,
        Stage::OrderCompleted,
    ];

    for step in path {
        if request.stage == target {
            return;
        }

        let mut command = AdvanceCommand::new(step, "tester");
        match step {
            Stage::Procurement => {
                command = command.with_requisition(RequisitionInput {
                    requisition_number: 100,
                    stock_handler: "carlos".to_string(),
                });
            }
            Stage::PurchaseOrder => {
                if request.selected_quote().is_none() {
                    let (id, _) =
                        quotations::add_quote_at(request, quote("Acme", dec!(900.00), 10), now)
                            .unwrap();
                    quotations::select_winner_at(request, id, "best overall offer", now).unwrap();
                }
            }
            Stage::Approved => {
                command = command.with_approval(ApprovalInput {
                    approver: "diana".to_string(),
                    decision: ApprovalDecision::Approved,
                    justification: Some("within budget".to_string()),
                });
            }
            _ => {}
        }

        engine.advance_at(request, command, now).unwrap();
    }
}
