//! Request Ledger
//!
//! Single source of truth for everything requiring audit:
//! - Privacy requests (export/erasure), concern reports, and
//!   account-deletion requests, each behind a strict state machine
//! - Deterministic triage routing with human-shareable case identifiers
//! - A hash-chained audit trail appended on every submit and transition
//! - The deletion orchestrator that fans an accepted guardian deletion out
//!   into independent per-learner erasure requests

pub mod audit;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod records;
pub mod state_machine;
pub mod triage;

pub use audit::{Actor, AuditEntry, AuditLog, AuditSink, TracingSink};
pub use error::LedgerError;
pub use ledger::{RequestFilter, RequestLedger};
pub use orchestrator::{DeletionOrchestrator, ErasureOutcome, ErasureTarget};
pub use records::{
    AccountDeletionRequest, ConcernCategory, ConcernReport, DeletionScope, DeletionStatus,
    NewConcernReport, NewDeletionRequest, NewPrivacyRequest, PrivacyRequest, PrivacyRequestKind,
    PrivacyStatus, ReportStatus,
};
pub use state_machine::{validate_transition, RequestState};
pub use triage::{route, CaseId, TriageRoute};
