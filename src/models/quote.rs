use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status of a supplier quote within a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStatus {
    /// Entered but neither chosen nor discarded.
    Pending,
    /// Chosen as the winning quote. At most one quote per request holds
    /// this status.
    Selected,
    /// Discarded; the supplier may submit a replacement quote.
    Rejected,
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteStatus::Pending => write!(f, "Pending"),
            QuoteStatus::Selected => write!(f, "Selected"),
            QuoteStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// A supplier's priced offer for a request's items.
///
/// Owned by exactly one request; created during the quotation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Stable identifier used to select a winner.
    pub id: Uuid,

    /// Supplier name. Duplicate active quotes for the same supplier are
    /// rejected case-insensitively.
    pub supplier: String,

    /// Quoted total for the whole request.
    pub total: Decimal,

    /// Promised delivery lead time in days.
    pub lead_time_days: i64,

    /// Payment terms as quoted (e.g. "Net 30").
    pub payment_terms: Option<String>,

    /// Free-text notes from the buyer.
    pub notes: Option<String>,

    /// When the quote was entered.
    pub submitted_at: DateTime<Utc>,

    pub status: QuoteStatus,

    /// Why this quote won; mandatory at selection time.
    pub justification: Option<String>,
}

impl QuoteRecord {
    pub fn is_selected(&self) -> bool {
        self.status == QuoteStatus::Selected
    }

    /// A quote counts against the duplicate-supplier rule unless it has
    /// been rejected.
    pub fn is_active(&self) -> bool {
        self.status != QuoteStatus::Rejected
    }
}
