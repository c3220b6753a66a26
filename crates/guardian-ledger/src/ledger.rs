//! Request ledger
//!
//! Concurrent store for the three request kinds. Submissions validate the
//! relationship and scope invariants before any insert; transitions are
//! compare-and-swap on the record's current state under the store's
//! per-entry lock, so a raced transition fails with `InvalidTransition`
//! instead of silently overwriting.

use crate::audit::{Actor, AuditEntry, AuditLog, AuditSink};
use crate::error::LedgerError;
use crate::records::{
    AccountDeletionRequest, ConcernReport, DeletionScope, DeletionStatus, NewConcernReport,
    NewDeletionRequest, NewPrivacyRequest, PrivacyRequest, PrivacyStatus, ReportStatus,
};
use crate::state_machine::{validate_transition, RequestState};
use crate::triage::{route, CaseId};
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use guardian_types::{GuardianId, LearnerId, LinkDirectory, RequestId, Requester, ReviewerId};
use std::sync::Arc;

/// Filter for ledger listings
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFilter {
    /// Only records submitted by this requester
    pub requester: Option<Requester>,
    /// Only records targeting this learner
    pub learner: Option<LearnerId>,
}

impl RequestFilter {
    /// Match everything
    #[inline]
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to a requester
    #[inline]
    #[must_use]
    pub fn by_requester(mut self, requester: Requester) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Restrict to a target learner
    #[inline]
    #[must_use]
    pub fn by_learner(mut self, learner: LearnerId) -> Self {
        self.learner = Some(learner);
        self
    }
}

/// The single source of truth for privacy requests, concern reports, and
/// account-deletion requests
pub struct RequestLedger {
    links: Arc<dyn LinkDirectory>,
    audit: Arc<AuditLog>,
    sink: Arc<dyn AuditSink>,
    privacy: DashMap<RequestId, PrivacyRequest>,
    reports: DashMap<RequestId, ConcernReport>,
    deletions: DashMap<RequestId, AccountDeletionRequest>,
    case_ids: DashSet<String>,
}

impl RequestLedger {
    /// Create a ledger over a link directory and an audit sink
    #[must_use]
    pub fn new(links: Arc<dyn LinkDirectory>, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            links,
            audit: Arc::new(AuditLog::new()),
            sink,
            privacy: DashMap::new(),
            reports: DashMap::new(),
            deletions: DashMap::new(),
            case_ids: DashSet::new(),
        }
    }

    /// The underlying audit trail
    #[inline]
    #[must_use]
    pub fn audit(&self) -> Arc<AuditLog> {
        Arc::clone(&self.audit)
    }

    // ---- submission -----------------------------------------------------

    /// Submit a privacy request.
    ///
    /// # Errors
    /// [`LedgerError::Unauthorized`] unless the requester holds an active
    /// link to the target learner or is the target themselves.
    pub fn submit_privacy(&self, new: NewPrivacyRequest) -> Result<PrivacyRequest, LedgerError> {
        self.authorize_target(new.requester, new.learner)?;

        let now = Utc::now();
        let record = PrivacyRequest {
            id: RequestId::new(),
            requester: new.requester,
            learner: new.learner,
            kind: new.kind,
            status: PrivacyStatus::Pending,
            contact_email: new.contact_email,
            reason: new.reason,
            admin_notes: None,
            handled_by: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };
        self.privacy.insert(record.id, record.clone());
        self.record_audit(
            Actor::Requester(record.requester),
            record.id,
            "submit",
            None,
            status_label(record.status),
        );
        tracing::info!(id = %record.id, kind = ?record.kind, "privacy request submitted");
        Ok(record)
    }

    /// Submit a concern report. Routing runs exactly once, here.
    ///
    /// # Errors
    /// [`LedgerError::CaseIdCollision`] if the generated case id already
    /// exists (uniqueness backstop).
    pub fn submit_report(&self, new: NewConcernReport) -> Result<ConcernReport, LedgerError> {
        let route = route(new.category);
        let case_id = CaseId::generate(route);
        if !self.case_ids.insert(case_id.as_str().to_string()) {
            tracing::error!(case = %case_id, "case id collision");
            return Err(LedgerError::CaseIdCollision);
        }

        let record = ConcernReport {
            id: RequestId::new(),
            requester: new.requester,
            learner: new.learner,
            category: new.category,
            description: new.description,
            contact_email: new.contact_email,
            screenshot_url: new.screenshot_url,
            route,
            case_id,
            status: ReportStatus::Open,
            created_at: Utc::now(),
        };
        self.reports.insert(record.id, record.clone());
        self.record_audit(
            Actor::Requester(record.requester),
            record.id,
            "submit",
            None,
            status_label(record.status),
        );
        tracing::info!(id = %record.id, case = %record.case_id, route = ?record.route, "concern report submitted");
        Ok(record)
    }

    /// Submit an account-deletion request.
    ///
    /// # Errors
    /// [`LedgerError::InvalidScope`] if the request is unconfirmed, the
    /// include set contradicts the scope, or the set is not a subset of the
    /// guardian's currently linked learners.
    pub fn submit_deletion(
        &self,
        new: NewDeletionRequest,
    ) -> Result<AccountDeletionRequest, LedgerError> {
        if !new.confirmed {
            return Err(LedgerError::InvalidScope(
                "deletion must be explicitly confirmed".to_string(),
            ));
        }
        match new.scope {
            DeletionScope::ParentOnly if !new.include_learners.is_empty() => {
                return Err(LedgerError::InvalidScope(
                    "parent-only scope cannot include learners".to_string(),
                ));
            }
            DeletionScope::ParentAndStudents if new.include_learners.is_empty() => {
                return Err(LedgerError::InvalidScope(
                    "no learners selected".to_string(),
                ));
            }
            DeletionScope::ParentAndStudents => {
                let linked = self.links.linked_learners(new.requester);
                if let Some(unlinked) = new.include_learners.iter().find(|l| !linked.contains(l)) {
                    tracing::warn!(guardian = %new.requester, learner = %unlinked, "deletion includes unlinked learner");
                    return Err(LedgerError::InvalidScope(
                        "selection includes a learner not linked to this guardian".to_string(),
                    ));
                }
            }
            DeletionScope::ParentOnly => {}
        }

        let record = AccountDeletionRequest {
            id: RequestId::new(),
            requester: new.requester,
            scope: new.scope,
            include_learners: new.include_learners,
            reason: new.reason,
            contact_email: new.contact_email,
            status: DeletionStatus::Pending,
            created_at: Utc::now(),
        };
        self.deletions.insert(record.id, record.clone());
        self.record_audit(
            Actor::Requester(Requester::Guardian(record.requester)),
            record.id,
            "submit",
            None,
            status_label(record.status),
        );
        tracing::info!(id = %record.id, scope = ?record.scope, "deletion request submitted");
        Ok(record)
    }

    // ---- transitions ----------------------------------------------------

    /// Transition a privacy request.
    ///
    /// Records the handling reviewer, stamps `resolved_at` on terminal
    /// states, and optionally appends admin notes.
    ///
    /// # Errors
    /// [`LedgerError::NotFound`] or [`LedgerError::InvalidTransition`].
    pub fn transition_privacy(
        &self,
        id: RequestId,
        next: PrivacyStatus,
        actor: ReviewerId,
        notes: Option<String>,
    ) -> Result<PrivacyRequest, LedgerError> {
        let mut entry = self.privacy.get_mut(&id).ok_or(LedgerError::NotFound)?;
        let before = entry.status;
        if let Err(e) = validate_transition(before, next) {
            tracing::warn!(%id, from = ?before, to = ?next, "rejected privacy transition");
            return Err(e);
        }

        let now = Utc::now();
        entry.status = next;
        entry.updated_at = now;
        entry.handled_by = Some(actor);
        if let Some(notes) = notes {
            entry.admin_notes = Some(notes);
        }
        if next.is_terminal() {
            entry.resolved_at = Some(now);
        }
        let after = entry.clone();
        drop(entry);

        self.record_audit(
            Actor::Reviewer(actor),
            id,
            "transition",
            Some(status_label(before)),
            status_label(next),
        );
        Ok(after)
    }

    /// Transition a concern report.
    ///
    /// # Errors
    /// [`LedgerError::NotFound`] or [`LedgerError::InvalidTransition`].
    pub fn transition_report(
        &self,
        id: RequestId,
        next: ReportStatus,
        actor: ReviewerId,
    ) -> Result<ConcernReport, LedgerError> {
        let mut entry = self.reports.get_mut(&id).ok_or(LedgerError::NotFound)?;
        let before = entry.status;
        if let Err(e) = validate_transition(before, next) {
            tracing::warn!(%id, from = ?before, to = ?next, "rejected report transition");
            return Err(e);
        }
        entry.status = next;
        let after = entry.clone();
        drop(entry);

        self.record_audit(
            Actor::Reviewer(actor),
            id,
            "transition",
            Some(status_label(before)),
            status_label(next),
        );
        Ok(after)
    }

    /// Transition an account-deletion request.
    ///
    /// Accepting does not itself perform any erasure; the deletion
    /// orchestrator expands accepted requests.
    ///
    /// # Errors
    /// [`LedgerError::NotFound`] or [`LedgerError::InvalidTransition`].
    pub fn transition_deletion(
        &self,
        id: RequestId,
        next: DeletionStatus,
        actor: ReviewerId,
    ) -> Result<AccountDeletionRequest, LedgerError> {
        let mut entry = self.deletions.get_mut(&id).ok_or(LedgerError::NotFound)?;
        let before = entry.status;
        if let Err(e) = validate_transition(before, next) {
            tracing::warn!(%id, from = ?before, to = ?next, "rejected deletion transition");
            return Err(e);
        }
        entry.status = next;
        let after = entry.clone();
        drop(entry);

        self.record_audit(
            Actor::Reviewer(actor),
            id,
            "transition",
            Some(status_label(before)),
            status_label(next),
        );
        Ok(after)
    }

    // ---- reads ----------------------------------------------------------

    /// Fetch one privacy request
    #[must_use]
    pub fn privacy_request(&self, id: RequestId) -> Option<PrivacyRequest> {
        self.privacy.get(&id).map(|r| r.clone())
    }

    /// Fetch one concern report
    #[must_use]
    pub fn concern_report(&self, id: RequestId) -> Option<ConcernReport> {
        self.reports.get(&id).map(|r| r.clone())
    }

    /// Fetch one deletion request
    #[must_use]
    pub fn deletion_request(&self, id: RequestId) -> Option<AccountDeletionRequest> {
        self.deletions.get(&id).map(|r| r.clone())
    }

    /// Privacy requests matching a filter
    #[must_use]
    pub fn list_privacy(&self, filter: &RequestFilter) -> Vec<PrivacyRequest> {
        self.privacy
            .iter()
            .filter(|r| {
                filter.requester.map_or(true, |q| q == r.requester)
                    && filter.learner.map_or(true, |l| l == r.learner)
            })
            .map(|r| r.clone())
            .collect()
    }

    /// Concern reports matching a filter
    #[must_use]
    pub fn list_reports(&self, filter: &RequestFilter) -> Vec<ConcernReport> {
        self.reports
            .iter()
            .filter(|r| {
                filter.requester.map_or(true, |q| q == r.requester)
                    && filter.learner.map_or(true, |l| r.learner == Some(l))
            })
            .map(|r| r.clone())
            .collect()
    }

    /// Deletion requests submitted by a guardian
    #[must_use]
    pub fn list_deletions(&self, guardian: GuardianId) -> Vec<AccountDeletionRequest> {
        self.deletions
            .iter()
            .filter(|r| r.requester == guardian)
            .map(|r| r.clone())
            .collect()
    }

    /// Privacy requests a guardian may see: their own submissions plus any
    /// record targeting one of their currently linked learners
    #[must_use]
    pub fn visible_privacy(&self, guardian: GuardianId) -> Vec<PrivacyRequest> {
        let linked = self.links.linked_learners(guardian);
        self.privacy
            .iter()
            .filter(|r| {
                r.requester == Requester::Guardian(guardian) || linked.contains(&r.learner)
            })
            .map(|r| r.clone())
            .collect()
    }

    /// Concern reports a guardian may see, scoped the same way
    #[must_use]
    pub fn visible_reports(&self, guardian: GuardianId) -> Vec<ConcernReport> {
        let linked = self.links.linked_learners(guardian);
        self.reports
            .iter()
            .filter(|r| {
                r.requester == Requester::Guardian(guardian)
                    || r.learner.map_or(false, |l| linked.contains(&l))
            })
            .map(|r| r.clone())
            .collect()
    }

    // ---- internals ------------------------------------------------------

    fn authorize_target(&self, requester: Requester, target: LearnerId) -> Result<(), LedgerError> {
        let authorized = match requester {
            Requester::Learner(l) => l == target,
            Requester::Guardian(g) => self.links.has_active_link(g, target),
        };
        if authorized {
            Ok(())
        } else {
            tracing::warn!(?requester, %target, "unauthorized submission");
            Err(LedgerError::Unauthorized)
        }
    }

    /// Append a system-actor audit entry (orchestrator actions)
    pub(crate) fn record_system_action(
        &self,
        record: RequestId,
        action: &str,
        before: Option<String>,
        after: String,
    ) {
        self.record_audit(Actor::System, record, action, before, after);
    }

    fn record_audit(
        &self,
        actor: Actor,
        record: RequestId,
        action: &str,
        before: Option<String>,
        after: String,
    ) {
        let entry = self
            .audit
            .append(AuditEntry::new(actor, record, action, before, after));
        self.sink.notify(&entry);
    }
}

fn status_label<S: std::fmt::Debug>(status: S) -> String {
    format!("{status:?}").to_lowercase()
}
