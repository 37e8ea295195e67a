// Lifecycle engine and its policy collaborators
pub mod approval_policy;
pub mod calendar;
pub mod lifecycle;
pub mod quotations;
pub mod sla;
