//! Request state machines
//!
//! Transitions are the only mutation path for ledger records. Each record
//! kind carries a closed transition table; terminal states have no
//! outgoing edges and can never be left.

use crate::error::LedgerError;
use crate::records::{DeletionStatus, PrivacyStatus, ReportStatus};

/// A ledger record status with a closed transition table
pub trait RequestState: Copy + Eq + std::fmt::Debug {
    /// States reachable from `self` in one transition
    fn allowed_transitions(self) -> Vec<Self>;

    /// Whether no transition leaves this state
    fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl RequestState for PrivacyStatus {
    fn allowed_transitions(self) -> Vec<Self> {
        use PrivacyStatus::*;
        match self {
            Pending => vec![InReview],
            InReview => vec![Fulfilled, Rejected],
            Fulfilled => vec![],
            Rejected => vec![],
        }
    }
}

impl RequestState for ReportStatus {
    fn allowed_transitions(self) -> Vec<Self> {
        use ReportStatus::*;
        match self {
            Open => vec![InReview],
            InReview => vec![Resolved, Closed],
            Resolved => vec![],
            Closed => vec![],
        }
    }
}

impl RequestState for DeletionStatus {
    fn allowed_transitions(self) -> Vec<Self> {
        use DeletionStatus::*;
        match self {
            Pending => vec![Accepted, Rejected],
            Accepted => vec![],
            Rejected => vec![],
        }
    }
}

/// Validates a state transition.
///
/// # Errors
/// [`LedgerError::InvalidTransition`] if `to` is not reachable from `from`.
pub fn validate_transition<S: RequestState>(from: S, to: S) -> Result<(), LedgerError> {
    if from.allowed_transitions().contains(&to) {
        Ok(())
    } else {
        Err(LedgerError::InvalidTransition)
    }
}
