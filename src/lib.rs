//! Procurement Lifecycle Engine
//!
//! This crate provides the core engine behind a procurement-request
//! tracking system: the stage state machine, business-day SLA accounting,
//! value-based approval routing, and supplier quotation comparison. It is a
//! synchronous, in-memory library: callers load a fully materialized
//! request, invoke operations, and persist the mutated aggregate plus the
//! emitted domain events.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod services;

pub use config::{PolicySettings, SettingsError};
pub use errors::EngineError;
pub use events::{dispatch, AuditSink, Event, MemoryAuditSink};
pub use models::approval::{ApprovalDecision, ApprovalRecord, ApprovalTier};
pub use models::quote::{QuoteRecord, QuoteStatus};
pub use models::request::{Department, LineItem, Priority, PurchaseRequest, Stage};
pub use models::transition::StageTransition;
pub use services::approval_policy::ApprovalPolicy;
pub use services::lifecycle::{
    AdvanceCommand, ApprovalInput, NewRequest, RequestLifecycle, RequisitionInput,
};
pub use services::quotations::QuoteInput;
pub use services::sla::{SlaPolicy, SlaReport};
