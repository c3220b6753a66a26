//! Ledger record types
//!
//! The ledger owns these records and is the only writer of their status;
//! records are never deleted (audit requirement).

use crate::triage::{CaseId, TriageRoute};
use chrono::{DateTime, Utc};
use guardian_types::{GuardianId, LearnerId, RequestId, Requester, ReviewerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a privacy request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivacyRequestKind {
    /// Export of the learner's stored data
    Export,
    /// Erasure of the learner's stored data
    Erasure,
}

/// Privacy request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivacyStatus {
    Pending,
    InReview,
    Fulfilled,
    Rejected,
}

/// Concern report lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Open,
    InReview,
    Resolved,
    Closed,
}

/// Account-deletion request lifecycle status.
///
/// `Accepted` triggers the deletion orchestrator; it does not itself imply
/// completion of the underlying erasure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Category of a concern report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcernCategory {
    Safety,
    Content,
    Data,
    Account,
    Billing,
    Other,
}

/// Which accounts a deletion request covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionScope {
    /// Only the guardian's own account
    ParentOnly,
    /// The guardian's account plus an explicit set of dependent learners
    ParentAndStudents,
}

/// A data-rights request targeting one learner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyRequest {
    pub id: RequestId,
    pub requester: Requester,
    pub learner: LearnerId,
    pub kind: PrivacyRequestKind,
    pub status: PrivacyStatus,
    pub contact_email: Option<String>,
    pub reason: Option<String>,
    pub admin_notes: Option<String>,
    pub handled_by: Option<ReviewerId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// A free-text safety/content/privacy/account complaint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcernReport {
    pub id: RequestId,
    pub requester: Requester,
    pub learner: Option<LearnerId>,
    pub category: ConcernCategory,
    pub description: String,
    pub contact_email: Option<String>,
    pub screenshot_url: Option<String>,
    /// Computed once at creation from the category, never recomputed
    pub route: TriageRoute,
    /// Human-shareable, unique
    pub case_id: CaseId,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

/// A guardian-initiated account-deletion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDeletionRequest {
    pub id: RequestId,
    pub requester: GuardianId,
    pub scope: DeletionScope,
    /// Non-empty iff `scope` includes students
    pub include_learners: BTreeSet<LearnerId>,
    pub reason: Option<String>,
    pub contact_email: Option<String>,
    pub status: DeletionStatus,
    pub created_at: DateTime<Utc>,
}

/// Submission input for a privacy request
#[derive(Debug, Clone)]
pub struct NewPrivacyRequest {
    pub requester: Requester,
    pub learner: LearnerId,
    pub kind: PrivacyRequestKind,
    pub contact_email: Option<String>,
    pub reason: Option<String>,
}

/// Submission input for a concern report
#[derive(Debug, Clone)]
pub struct NewConcernReport {
    pub requester: Requester,
    pub learner: Option<LearnerId>,
    pub category: ConcernCategory,
    pub description: String,
    pub contact_email: Option<String>,
    pub screenshot_url: Option<String>,
}

/// Submission input for an account-deletion request
#[derive(Debug, Clone)]
pub struct NewDeletionRequest {
    pub requester: GuardianId,
    pub scope: DeletionScope,
    pub include_learners: BTreeSet<LearnerId>,
    /// Explicit confirmation of the irreversible action
    pub confirmed: bool,
    pub reason: Option<String>,
    pub contact_email: Option<String>,
}
