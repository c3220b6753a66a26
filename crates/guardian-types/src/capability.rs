//! Capability seams between the pipeline crates
//!
//! The ledger validates guardian/learner relationships through
//! [`LinkDirectory`]; the registry enforces plan seat ceilings through
//! [`SeatCapability`]. Both are traits so the billing system and the link
//! registry stay swappable in tests.

use crate::ids::{GuardianId, LearnerId};

/// Read-only view of guardian-learner relationships.
///
/// Implemented by the link registry; consumed by the request ledger to
/// enforce the requester-target invariant.
pub trait LinkDirectory: Send + Sync {
    /// Whether `guardian` currently holds an `active` link to `learner`
    fn has_active_link(&self, guardian: GuardianId, learner: LearnerId) -> bool;

    /// All learners `guardian` currently holds an `active` link to
    fn linked_learners(&self, guardian: GuardianId) -> Vec<LearnerId>;
}

/// Plan-derived seat ceiling lookup.
///
/// The ceiling is sourced from the guardian's current subscription plan,
/// which lives outside this pipeline.
pub trait SeatCapability: Send + Sync {
    /// Maximum number of `active` links this guardian's plan permits
    fn seat_ceiling(&self, guardian: GuardianId) -> u32;
}

/// Fixed-ceiling plan, for single-plan deployments and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedSeatPlan {
    ceiling: u32,
}

impl FixedSeatPlan {
    /// Create a plan granting `ceiling` seats to every guardian
    #[inline]
    #[must_use]
    pub fn new(ceiling: u32) -> Self {
        Self { ceiling }
    }
}

impl SeatCapability for FixedSeatPlan {
    fn seat_ceiling(&self, _guardian: GuardianId) -> u32 {
        self.ceiling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_plan_ceiling() {
        let plan = FixedSeatPlan::new(3);
        assert_eq!(plan.seat_ceiling(GuardianId::new()), 3);
    }
}
