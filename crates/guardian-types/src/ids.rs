//! Newtype identifiers for pipeline entities

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique guardian (parent) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GuardianId(pub Uuid);

impl GuardianId {
    /// Generate a new guardian ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GuardianId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GuardianId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique learner (student) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LearnerId(pub Uuid);

impl LearnerId {
    /// Generate a new learner ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LearnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LearnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique guardian-link identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkId(pub Uuid);

impl LinkId {
    /// Generate a new link ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LinkId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique ledger-record identifier (privacy request, concern report,
/// or account-deletion request)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Generate a new request ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Staff reviewer identifier, recorded on every ledger transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewerId(pub Uuid);

impl ReviewerId {
    /// Generate a new reviewer ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReviewerId {
    fn default() -> Self {
        Self::new()
    }
}

/// The principal submitting a ledger request.
///
/// Authorization is variant-specific: a guardian requester must hold an
/// active link to the target learner; a learner requester must be the
/// target (self-service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Requester {
    /// A guardian acting on behalf of a linked learner
    Guardian(GuardianId),
    /// A learner acting on their own account
    Learner(LearnerId),
}

impl Requester {
    /// Whether this requester is the learner themselves
    #[inline]
    #[must_use]
    pub fn is_self(&self, target: LearnerId) -> bool {
        matches!(self, Requester::Learner(l) if *l == target)
    }

    /// The guardian behind this requester, if any
    #[inline]
    #[must_use]
    pub fn as_guardian(&self) -> Option<GuardianId> {
        match self {
            Requester::Guardian(g) => Some(*g),
            Requester::Learner(_) => None,
        }
    }
}
