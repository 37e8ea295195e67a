//! SLA targets and turnaround accounting.
//!
//! The target is assigned once, at request creation, from the policy
//! snapshot in force at that moment, and stored on the request. Breach and
//! usage checks read only the stored target, so later policy changes never
//! rewrite the history of past requests.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::request::{Department, Priority, PurchaseRequest};
use crate::services::calendar::elapsed_business_days;

/// Fallback when a priority is somehow absent from the mapping.
pub const DEFAULT_TARGET_DAYS: i64 = 3;

/// The standard targets applied when no configuration overrides them.
static STANDARD_PRIORITY_DAYS: Lazy<HashMap<Priority, i64>> = Lazy::new(|| {
    HashMap::from([
        (Priority::Urgent, 1),
        (Priority::High, 2),
        (Priority::Normal, 3),
        (Priority::Low, 5),
    ])
});

/// The standard per-priority targets: Urgent 1, High 2, Normal 3, Low 5.
pub fn standard_priority_days() -> HashMap<Priority, i64> {
    STANDARD_PRIORITY_DAYS.clone()
}

/// Immutable SLA policy snapshot: business-day targets per priority, with
/// optional per-department overrides that win over the priority mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaPolicy {
    priority_days: HashMap<Priority, i64>,
    department_days: HashMap<Department, i64>,
}

impl SlaPolicy {
    pub fn new(
        priority_days: HashMap<Priority, i64>,
        department_days: HashMap<Department, i64>,
    ) -> Self {
        Self {
            priority_days,
            department_days,
        }
    }

    /// The business-day target for a new request.
    pub fn target_days(&self, priority: Priority, department: Department) -> i64 {
        if let Some(days) = self.department_days.get(&department) {
            return *days;
        }
        self.priority_days
            .get(&priority)
            .copied()
            .unwrap_or(DEFAULT_TARGET_DAYS)
    }
}

impl Default for SlaPolicy {
    /// The standard mapping with no department overrides.
    fn default() -> Self {
        Self::new(standard_priority_days(), HashMap::new())
    }
}

/// Derived SLA view of one request, as dashboards present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaReport {
    pub elapsed_days: i64,
    pub target_days: i64,
    pub breached: bool,
    pub near_breach: bool,
    /// Share of the target already consumed, capped at 100.
    pub percent_used: i64,
}

impl SlaReport {
    /// True while the request is still within its target.
    pub fn compliant(&self) -> bool {
        !self.breached
    }
}

/// Business days consumed so far, measured from creation to the terminal
/// timestamp for closed requests or to `now` for open ones.
pub fn elapsed_at(request: &PurchaseRequest, now: DateTime<Utc>) -> i64 {
    elapsed_business_days(request.created_at, request.sla_clock_end(now))
}

/// Strictly greater-than: a request exactly on its target is compliant.
pub fn is_breached_at(request: &PurchaseRequest, now: DateTime<Utc>) -> bool {
    elapsed_at(request, now) > request.sla_target_days
}

/// Early warning: within one business day of the target and not yet
/// breached. Has no effect on transitions.
pub fn is_near_breach_at(request: &PurchaseRequest, now: DateTime<Utc>) -> bool {
    let elapsed = elapsed_at(request, now);
    elapsed >= request.sla_target_days - 1 && elapsed <= request.sla_target_days
}

/// `min(100, floor(elapsed / target * 100))`; 0 when the target is not
/// positive.
pub fn percent_used_at(request: &PurchaseRequest, now: DateTime<Utc>) -> i64 {
    let target = request.sla_target_days;
    if target <= 0 {
        return 0;
    }
    (elapsed_at(request, now) * 100 / target).min(100)
}

/// Full SLA snapshot at a given instant.
pub fn report_at(request: &PurchaseRequest, now: DateTime<Utc>) -> SlaReport {
    SlaReport {
        elapsed_days: elapsed_at(request, now),
        target_days: request.sla_target_days,
        breached: is_breached_at(request, now),
        near_breach: is_near_breach_at(request, now),
        percent_used: percent_used_at(request, now),
    }
}

/// Convenience wrappers using the current wall clock.
pub fn is_breached(request: &PurchaseRequest) -> bool {
    is_breached_at(request, Utc::now())
}

pub fn is_near_breach(request: &PurchaseRequest) -> bool {
    is_near_breach_at(request, Utc::now())
}

pub fn percent_used(request: &PurchaseRequest) -> i64 {
    percent_used_at(request, Utc::now())
}

pub fn report(request: &PurchaseRequest) -> SlaReport {
    report_at(request, Utc::now())
}
