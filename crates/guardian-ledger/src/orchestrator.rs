//! Deletion orchestrator
//!
//! Expands an accepted account-deletion request into independent erasure
//! actions: one for the guardian's own account, plus one erasure privacy
//! request per included learner. Each enqueue is independent; a failure
//! never rolls back its siblings.

use crate::error::LedgerError;
use crate::ledger::RequestLedger;
use crate::records::{DeletionScope, DeletionStatus, NewPrivacyRequest, PrivacyRequestKind};
use guardian_types::{GuardianId, LearnerId, RequestId, Requester};
use std::sync::Arc;

/// What an erasure action targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErasureTarget {
    /// The requesting guardian's own account
    GuardianAccount(GuardianId),
    /// A dependent learner account
    Learner(LearnerId),
}

/// Per-target result of the fan-out
#[derive(Debug, Clone)]
pub struct ErasureOutcome {
    /// The account this action covers
    pub target: ErasureTarget,
    /// The enqueued request id, or why enqueueing failed
    pub result: Result<RequestId, LedgerError>,
}

/// Expands accepted deletion requests through the normal ledger path
pub struct DeletionOrchestrator {
    ledger: Arc<RequestLedger>,
}

impl DeletionOrchestrator {
    /// Create an orchestrator over a ledger
    #[inline]
    #[must_use]
    pub fn new(ledger: Arc<RequestLedger>) -> Self {
        Self { ledger }
    }

    /// Expand one accepted deletion request.
    ///
    /// Per-learner erasures go through [`RequestLedger::submit_privacy`]
    /// with the guardian as requester of record, so each stays subject to
    /// the normal state machine and relationship invariant. The
    /// guardian-account action and the expansion itself are appended to
    /// the audit trail as system actions.
    ///
    /// # Errors
    /// - [`LedgerError::NotFound`] if the request id does not exist
    /// - [`LedgerError::InvalidTransition`] if the request is not `accepted`
    pub fn execute(&self, id: RequestId) -> Result<Vec<ErasureOutcome>, LedgerError> {
        let request = self.ledger.deletion_request(id).ok_or(LedgerError::NotFound)?;
        if request.status != DeletionStatus::Accepted {
            tracing::warn!(%id, status = ?request.status, "orchestrator refused non-accepted request");
            return Err(LedgerError::InvalidTransition);
        }

        // The guardian's own account erasure runs outside the
        // learner-scoped ledger; its action id resolves to an audit entry
        // so the action stays observable after expansion.
        let account_action = RequestId::new();
        self.ledger.record_system_action(
            account_action,
            "erase_account",
            None,
            format!("enqueued for guardian {}", request.requester),
        );
        let mut outcomes = vec![ErasureOutcome {
            target: ErasureTarget::GuardianAccount(request.requester),
            result: Ok(account_action),
        }];

        if request.scope == DeletionScope::ParentAndStudents {
            for learner in &request.include_learners {
                let result = self
                    .ledger
                    .submit_privacy(NewPrivacyRequest {
                        requester: Requester::Guardian(request.requester),
                        learner: *learner,
                        kind: PrivacyRequestKind::Erasure,
                        contact_email: request.contact_email.clone(),
                        reason: Some(format!("cascade of deletion request {id}")),
                    })
                    .map(|r| r.id);
                if let Err(e) = &result {
                    tracing::warn!(%id, %learner, error = %e, "cascade erasure enqueue failed");
                }
                outcomes.push(ErasureOutcome {
                    target: ErasureTarget::Learner(*learner),
                    result,
                });
            }
        }

        self.ledger.record_system_action(
            id,
            "expand",
            Some("accepted".to_string()),
            format!("{} erasure actions", outcomes.len()),
        );
        tracing::info!(%id, actions = outcomes.len(), "deletion request expanded");
        Ok(outcomes)
    }
}
