//! Triage router
//!
//! A pure mapping from concern category to destination queue. The router
//! never reads request content, so routing stays deterministic and
//! testable independent of free text.

use crate::records::ConcernCategory;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Destination queue for a concern report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriageRoute {
    /// Trust & safety queue
    Trust,
    /// Privacy/data-rights queue
    Privacy,
    /// General support queue
    Support,
}

impl TriageRoute {
    /// Case-id prefix for this queue
    #[inline]
    #[must_use]
    pub fn case_prefix(self) -> &'static str {
        match self {
            TriageRoute::Trust => "TS",
            TriageRoute::Privacy => "PR",
            TriageRoute::Support => "SP",
        }
    }
}

/// Map a category to its destination queue.
///
/// Closed table: adding a category is a compile-time-checked change.
#[must_use]
pub fn route(category: ConcernCategory) -> TriageRoute {
    use ConcernCategory::*;
    match category {
        Safety | Content => TriageRoute::Trust,
        Data => TriageRoute::Privacy,
        Account | Billing | Other => TriageRoute::Support,
    }
}

/// Human-shareable case identifier: route prefix + ULID.
///
/// The ULID encodes the submission timestamp and a random suffix, making
/// collisions negligible by construction; the ledger still enforces
/// uniqueness at insert as a backstop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId(String);

impl CaseId {
    /// Generate a case id for a queue
    #[must_use]
    pub fn generate(route: TriageRoute) -> Self {
        Self(format!("{}-{}", route.case_prefix(), Ulid::new()))
    }

    /// The identifier as text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
