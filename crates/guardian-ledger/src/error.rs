//! Ledger errors

/// Failures of ledger submission, transition, and orchestration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Requester does not hold an active link to the target learner and is
    /// not the target themselves
    #[error("requester is not authorized for the target learner")]
    Unauthorized,

    /// Deletion request violates the scope/id-set invariant
    #[error("invalid deletion scope: {0}")]
    InvalidScope(String),

    /// Transition is not an edge of the record's state machine, or the
    /// record's state changed concurrently
    #[error("illegal state transition")]
    InvalidTransition,

    /// Record id does not exist
    #[error("record not found")]
    NotFound,

    /// Generated case id already exists (ledger uniqueness backstop)
    #[error("case id collision")]
    CaseIdCollision,
}
