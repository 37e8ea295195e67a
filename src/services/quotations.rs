//! Supplier quote entry, comparison, and winner selection.
//!
//! Winner selection is the gate the lifecycle consults before a request may
//! leave the quotation stage: no selected, justified quote, no purchase
//! order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::errors::EngineError;
use crate::events::Event;
use crate::models::quote::{QuoteRecord, QuoteStatus};
use crate::models::request::{PurchaseRequest, Stage};

/// Input payload for a new supplier quote.
#[derive(Debug, Clone, Validate)]
pub struct QuoteInput {
    #[validate(length(min = 1))]
    pub supplier: String,

    #[validate(custom = "validate_non_negative")]
    pub total: Decimal,

    #[validate(range(min = 0))]
    pub lead_time_days: i64,

    pub payment_terms: Option<String>,

    pub notes: Option<String>,
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative_total"));
    }
    Ok(())
}

/// Quote mutations are confined to the quotation stage; a closed request is
/// immutable outside the lifecycle operations.
fn ensure_quotation_open(request: &PurchaseRequest) -> Result<(), EngineError> {
    if request.stage.is_terminal() {
        return Err(EngineError::TerminalState {
            request_number: request.request_number,
            stage: request.stage,
        });
    }
    if request.stage != Stage::InQuotation {
        return Err(EngineError::QuotationNotOpen {
            request_number: request.request_number,
            stage: request.stage,
        });
    }
    Ok(())
}

/// Appends a quote to a request sitting in the quotation stage.
///
/// Rejects a second active quote from the same supplier (case-insensitive)
/// so a buyer cannot double-enter an offer; rejecting the earlier quote
/// first frees the supplier name again.
#[instrument(skip(request, input), fields(request_number = request.request_number, supplier = %input.supplier))]
pub fn add_quote_at(
    request: &mut PurchaseRequest,
    input: QuoteInput,
    now: DateTime<Utc>,
) -> Result<(Uuid, Vec<Event>), EngineError> {
    ensure_quotation_open(request)?;
    input.validate()?;

    let duplicate = request
        .quotes
        .iter()
        .any(|q| q.is_active() && q.supplier.eq_ignore_ascii_case(&input.supplier));
    if duplicate {
        return Err(EngineError::DuplicateSupplier {
            request_number: request.request_number,
            supplier: input.supplier,
        });
    }

    let quote = QuoteRecord {
        id: Uuid::new_v4(),
        supplier: input.supplier,
        total: input.total,
        lead_time_days: input.lead_time_days,
        payment_terms: input.payment_terms,
        notes: input.notes,
        submitted_at: now,
        status: QuoteStatus::Pending,
        justification: None,
    };
    let event = Event::QuoteAdded {
        request_number: request.request_number,
        quote_id: quote.id,
        supplier: quote.supplier.clone(),
        total: quote.total,
        timestamp: now,
    };
    let id = quote.id;
    request.quotes.push(quote);

    info!("quote added to request #{}", request.request_number);
    Ok((id, vec![event]))
}

pub fn add_quote(
    request: &mut PurchaseRequest,
    input: QuoteInput,
) -> Result<(Uuid, Vec<Event>), EngineError> {
    add_quote_at(request, input, Utc::now())
}

/// Marks one quote as the winner, clearing any previous selection.
///
/// A non-empty justification is mandatory; the winner's supplier and total
/// become the request's recommendation, which the purchase step later turns
/// into the final supplier and value.
#[instrument(skip(request, justification), fields(request_number = request.request_number, quote_id = %quote_id))]
pub fn select_winner_at(
    request: &mut PurchaseRequest,
    quote_id: Uuid,
    justification: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Event>, EngineError> {
    ensure_quotation_open(request)?;
    let justification = justification.trim();
    if justification.is_empty() {
        return Err(EngineError::MissingJustification {
            request_number: request.request_number,
        });
    }
    if !request.quotes.iter().any(|q| q.id == quote_id) {
        return Err(EngineError::QuoteNotFound {
            request_number: request.request_number,
            quote_id,
        });
    }

    let mut event = None;
    for quote in &mut request.quotes {
        if quote.id == quote_id {
            quote.status = QuoteStatus::Selected;
            quote.justification = Some(justification.to_string());
            request.recommended_supplier = Some(quote.supplier.clone());
            request.recommended_value = Some(quote.total);
            event = Some(Event::QuoteSelected {
                request_number: request.request_number,
                quote_id,
                supplier: quote.supplier.clone(),
                total: quote.total,
                justification: justification.to_string(),
                timestamp: now,
            });
        } else if quote.status == QuoteStatus::Selected {
            quote.status = QuoteStatus::Pending;
            quote.justification = None;
        }
    }

    info!(
        "quote selected for request #{}: {}",
        request.request_number,
        request.recommended_supplier.as_deref().unwrap_or("?")
    );
    // The existence check above guarantees the event was built.
    Ok(event.into_iter().collect())
}

pub fn select_winner(
    request: &mut PurchaseRequest,
    quote_id: Uuid,
    justification: &str,
) -> Result<Vec<Event>, EngineError> {
    select_winner_at(request, quote_id, justification, Utc::now())
}

/// Discards a quote, freeing its supplier to submit a corrected one.
/// Rejecting the selected quote also clears the request's recommendation.
pub fn reject_quote(request: &mut PurchaseRequest, quote_id: Uuid) -> Result<(), EngineError> {
    ensure_quotation_open(request)?;
    let quote = request
        .quotes
        .iter_mut()
        .find(|q| q.id == quote_id)
        .ok_or(EngineError::QuoteNotFound {
            request_number: request.request_number,
            quote_id,
        })?;

    if quote.status == QuoteStatus::Selected {
        request.recommended_supplier = None;
        request.recommended_value = None;
    }
    quote.status = QuoteStatus::Rejected;
    quote.justification = None;
    Ok(())
}

/// Ranks the request's quotes for decision support: ascending total, ties
/// broken by shortest lead time, then by earliest submission. Pure; the
/// request is untouched.
pub fn compare(request: &PurchaseRequest) -> Vec<&QuoteRecord> {
    let mut ranked: Vec<&QuoteRecord> = request.quotes.iter().collect();
    ranked.sort_by(|a, b| {
        a.total
            .cmp(&b.total)
            .then(a.lead_time_days.cmp(&b.lead_time_days))
            .then(a.submitted_at.cmp(&b.submitted_at))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::{Department, Priority, Stage};
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn request() -> PurchaseRequest {
        PurchaseRequest {
            request_number: 1,
            requester: "ana".to_string(),
            department: Department::Maintenance,
            priority: Priority::Normal,
            description: "bearings".to_string(),
            application_site: "plant 2".to_string(),
            estimated_value: Some(dec!(1200.00)),
            final_value: None,
            recommended_supplier: None,
            recommended_value: None,
            final_supplier: None,
            requisition_number: None,
            stock_handler: None,
            created_at: Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap(),
            completed_at: None,
            sla_target_days: 3,
            required_tier: None,
            stage: Stage::InQuotation,
            items: vec![],
            quotes: vec![],
            approvals: vec![],
            history: vec![],
        }
    }

    fn quote(supplier: &str, total: Decimal, lead: i64) -> QuoteInput {
        QuoteInput {
            supplier: supplier.to_string(),
            total,
            lead_time_days: lead,
            payment_terms: None,
            notes: None,
        }
    }

    #[test]
    fn duplicate_supplier_is_rejected_case_insensitively() {
        let mut req = request();
        add_quote(&mut req, quote("Acme", dec!(100.00), 5)).unwrap();
        let err = add_quote(&mut req, quote("ACME", dec!(90.00), 5)).unwrap_err();
        assert_matches!(err, EngineError::DuplicateSupplier { .. });
        assert_eq!(req.quotes.len(), 1);
    }

    #[test]
    fn rejected_quote_frees_the_supplier_name() {
        let mut req = request();
        let (id, _) = add_quote(&mut req, quote("Acme", dec!(100.00), 5)).unwrap();
        reject_quote(&mut req, id).unwrap();
        assert!(add_quote(&mut req, quote("acme", dec!(95.00), 4)).is_ok());
    }

    #[test]
    fn selection_requires_justification() {
        let mut req = request();
        let (id, _) = add_quote(&mut req, quote("Acme", dec!(100.00), 5)).unwrap();
        let err = select_winner(&mut req, id, "   ").unwrap_err();
        assert_matches!(err, EngineError::MissingJustification { .. });
        assert!(req.selected_quote().is_none());
    }

    #[test]
    fn selecting_again_moves_the_selection() {
        let mut req = request();
        let (a, _) = add_quote(&mut req, quote("Acme", dec!(100.00), 5)).unwrap();
        let (b, _) = add_quote(&mut req, quote("Blue", dec!(90.00), 7)).unwrap();

        select_winner(&mut req, a, "only option reviewed").unwrap();
        select_winner(&mut req, b, "better price").unwrap();

        let selected: Vec<Uuid> = req
            .quotes
            .iter()
            .filter(|q| q.is_selected())
            .map(|q| q.id)
            .collect();
        assert_eq!(selected, vec![b]);
        assert_eq!(req.recommended_supplier.as_deref(), Some("Blue"));
        assert_eq!(req.recommended_value, Some(dec!(90.00)));
    }

    #[test]
    fn compare_orders_by_total_then_lead_time_then_submission() {
        let mut req = request();
        let t0 = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 6, 10, 10, 0, 0).unwrap();
        add_quote_at(&mut req, quote("Slow", dec!(100.00), 10), t0).unwrap();
        add_quote_at(&mut req, quote("Fast", dec!(100.00), 3), t1).unwrap();
        add_quote_at(&mut req, quote("Cheap", dec!(80.00), 15), t1).unwrap();

        let ranked: Vec<&str> = compare(&req).iter().map(|q| q.supplier.as_str()).collect();
        assert_eq!(ranked, vec!["Cheap", "Fast", "Slow"]);

        // Idempotent: a second call on the unmodified list ranks identically.
        let again: Vec<&str> = compare(&req).iter().map(|q| q.supplier.as_str()).collect();
        assert_eq!(ranked, again);
    }

    #[test]
    fn closed_requests_refuse_quote_changes() {
        let mut req = request();
        let (id, _) = add_quote(&mut req, quote("Acme", dec!(100.00), 5)).unwrap();
        select_winner(&mut req, id, "only offer").unwrap();
        req.stage = Stage::Rejected;
        req.completed_at = Some(Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap());

        let err = add_quote(&mut req, quote("Beta", dec!(90.00), 4)).unwrap_err();
        assert_matches!(err, EngineError::TerminalState { .. });
        let err = select_winner(&mut req, id, "late change").unwrap_err();
        assert_matches!(err, EngineError::TerminalState { .. });
        let err = reject_quote(&mut req, id).unwrap_err();
        assert_matches!(err, EngineError::TerminalState { .. });

        assert_eq!(req.quotes.len(), 1);
        assert!(req.quotes[0].is_selected());
        assert_eq!(req.recommended_supplier.as_deref(), Some("Acme"));
    }

    #[test]
    fn quotes_only_change_during_the_quotation_stage() {
        let mut req = request();
        req.stage = Stage::PurchaseOrder;

        let err = add_quote(&mut req, quote("Acme", dec!(100.00), 5)).unwrap_err();
        assert_matches!(
            err,
            EngineError::QuotationNotOpen {
                stage: Stage::PurchaseOrder,
                ..
            }
        );
        assert!(req.quotes.is_empty());
    }

    #[test]
    fn unknown_quote_id_is_reported() {
        let mut req = request();
        let err = select_winner(&mut req, Uuid::new_v4(), "why not").unwrap_err();
        assert_matches!(err, EngineError::QuoteNotFound { .. });
    }
}
