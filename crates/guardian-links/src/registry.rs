//! Guardian link registry
//!
//! All mutation happens under one registry lock so the seat-ceiling check,
//! the consent gate, link creation, and code consumption are a single
//! serialized operation: two concurrent redemptions at the seat boundary
//! can never both succeed.

use crate::error::LinkError;
use crate::policy::LinkPolicy;
use guardian_types::{unix_now, GuardianId, LearnerId, LinkDirectory, LinkId, SeatCapability};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Guardian-learner relationship status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkStatus {
    /// Invitation issued, not yet redeemed by a guardian
    Pending,
    /// Redeemed and in force
    Active,
    /// Ended by the guardian; retained for audit
    Revoked,
}

/// A guardian-learner relationship record.
///
/// `guardian` is `None` while the link is a pending invitation; redemption
/// fills it in and activates the link in the same serialized step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianLink {
    /// Unique link id
    pub id: LinkId,
    /// The minor's account
    pub learner: LearnerId,
    /// The guardian side, set at redemption
    pub guardian: Option<GuardianId>,
    /// Free-form relationship label ("mother", "tutor", ...)
    pub relationship: Option<String>,
    /// Current status
    pub status: LinkStatus,
    /// Unix time the invitation code was issued
    pub invited_at: Option<u64>,
    /// Unix time the code was redeemed
    pub accepted_at: Option<u64>,
    /// Auxiliary facts (consent attestation, declared age)
    pub metadata: BTreeMap<String, String>,
}

impl GuardianLink {
    /// Whether this link currently counts toward seat accounting
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == LinkStatus::Active
    }
}

/// A single-use, expiring linking code bound to a learner
#[derive(Debug, Clone)]
pub struct LinkingCode {
    /// The human-shareable code
    pub code: String,
    /// The pending link this code belongs to
    pub link_id: LinkId,
    /// Unix expiry instant
    pub expires_at: u64,
}

#[derive(Debug)]
struct CodeState {
    link_id: LinkId,
    learner: LearnerId,
    declared_age: Option<u8>,
    expires_at: u64,
    consumed: bool,
}

#[derive(Debug, Default)]
struct RegistryState {
    links: HashMap<LinkId, GuardianLink>,
    codes: HashMap<String, CodeState>,
}

impl RegistryState {
    fn active_count(&self, guardian: GuardianId) -> u32 {
        self.links
            .values()
            .filter(|l| l.is_active() && l.guardian == Some(guardian))
            .count() as u32
    }

    fn has_active_pair(&self, guardian: GuardianId, learner: LearnerId) -> bool {
        self.links
            .values()
            .any(|l| l.is_active() && l.guardian == Some(guardian) && l.learner == learner)
    }
}

/// Registry of guardian links and outstanding linking codes
pub struct GuardianRegistry {
    policy: LinkPolicy,
    seats: Arc<dyn SeatCapability>,
    inner: Mutex<RegistryState>,
}

impl GuardianRegistry {
    /// Create a registry with the given policy and seat-capability source
    #[must_use]
    pub fn new(policy: LinkPolicy, seats: Arc<dyn SeatCapability>) -> Self {
        Self {
            policy,
            seats,
            inner: Mutex::new(RegistryState::default()),
        }
    }

    /// Issue a linking code for a learner.
    ///
    /// Records a `Pending` invitation link and a single-use code bound to
    /// it. `declared_age` is the learner's self-declared age, used for the
    /// consent gate at redemption.
    pub fn issue_code(&self, learner: LearnerId, declared_age: Option<u8>) -> LinkingCode {
        let now = unix_now();
        let link_id = LinkId::new();
        let code = generate_code(self.policy.code_length);
        let expires_at = now + self.policy.code_ttl_secs;

        let mut metadata = BTreeMap::new();
        if let Some(age) = declared_age {
            metadata.insert("declared_age".to_string(), age.to_string());
        }

        let mut state = self.inner.lock();
        state.links.insert(
            link_id,
            GuardianLink {
                id: link_id,
                learner,
                guardian: None,
                relationship: None,
                status: LinkStatus::Pending,
                invited_at: Some(now),
                accepted_at: None,
                metadata,
            },
        );
        state.codes.insert(
            code.clone(),
            CodeState {
                link_id,
                learner,
                declared_age,
                expires_at,
                consumed: false,
            },
        );
        drop(state);

        tracing::info!(%learner, link = ?link_id, "issued linking code");
        LinkingCode {
            code,
            link_id,
            expires_at,
        }
    }

    /// Redeem a linking code, creating an `Active` guardian link.
    ///
    /// # Errors
    /// - [`LinkError::InvalidCode`] if the code is unknown, expired, or consumed
    /// - [`LinkError::ConsentRequired`] if the learner is under the policy
    ///   age threshold and `consent_attested` is false
    /// - [`LinkError::AlreadyLinked`] if the guardian already holds an
    ///   active link to this learner
    /// - [`LinkError::SeatLimitReached`] if the guardian's plan ceiling is
    ///   already met
    pub fn redeem(
        &self,
        code: &str,
        guardian: GuardianId,
        relationship: Option<String>,
        consent_attested: bool,
    ) -> Result<GuardianLink, LinkError> {
        let now = unix_now();
        let mut state = self.inner.lock();

        // Every check below must fail before anything is mutated.
        let (link_id, learner) = match state.codes.get(code) {
            Some(c) if !c.consumed && now < c.expires_at => {
                if under_threshold(c.declared_age, self.policy.consent_age_threshold)
                    && !consent_attested
                {
                    tracing::warn!(%guardian, "redemption refused: consent not attested");
                    return Err(LinkError::ConsentRequired {
                        threshold: self.policy.consent_age_threshold,
                    });
                }
                (c.link_id, c.learner)
            }
            _ => return Err(LinkError::InvalidCode),
        };

        if state.has_active_pair(guardian, learner) {
            return Err(LinkError::AlreadyLinked);
        }

        let ceiling = self.seats.seat_ceiling(guardian);
        if state.active_count(guardian) >= ceiling {
            tracing::warn!(%guardian, ceiling, "redemption refused: seat limit");
            return Err(LinkError::SeatLimitReached { ceiling });
        }

        if let Some(c) = state.codes.get_mut(code) {
            c.consumed = true;
        }
        let link = state
            .links
            .get_mut(&link_id)
            .ok_or(LinkError::LinkNotFound)?;
        link.guardian = Some(guardian);
        link.relationship = relationship;
        link.status = LinkStatus::Active;
        link.accepted_at = Some(now);
        link.metadata
            .insert("consent_attested".to_string(), consent_attested.to_string());
        let redeemed = link.clone();
        drop(state);

        tracing::info!(%guardian, learner = %redeemed.learner, link = ?link_id, "link activated");
        Ok(redeemed)
    }

    /// Revoke a link the calling guardian owns.
    ///
    /// Revocation is immediate. Ledger records created while the link was
    /// active keep their historical requester-target relationship.
    ///
    /// # Errors
    /// - [`LinkError::LinkNotFound`] if the id does not exist
    /// - [`LinkError::Unauthorized`] if the caller does not own the link
    pub fn revoke(&self, link_id: LinkId, guardian: GuardianId) -> Result<(), LinkError> {
        let mut state = self.inner.lock();
        let link = state
            .links
            .get_mut(&link_id)
            .ok_or(LinkError::LinkNotFound)?;
        if link.guardian != Some(guardian) {
            return Err(LinkError::Unauthorized);
        }
        link.status = LinkStatus::Revoked;
        drop(state);

        tracing::info!(%guardian, link = ?link_id, "link revoked");
        Ok(())
    }

    /// Drop consumed and expired codes, along with pending invitations
    /// that can no longer be redeemed
    pub fn evict_expired(&self) {
        self.evict_expired_at(unix_now());
    }

    /// Eviction against an explicit clock
    pub fn evict_expired_at(&self, now: u64) {
        let mut state = self.inner.lock();
        let mut dead_links = Vec::new();
        state.codes.retain(|_, c| {
            let dead = c.consumed || now >= c.expires_at;
            if dead {
                dead_links.push(c.link_id);
            }
            !dead
        });
        // A consumed code's link went active; only unredeemed invitations
        // are dropped with their code.
        for link_id in dead_links {
            let pending = state
                .links
                .get(&link_id)
                .map_or(false, |l| l.status == LinkStatus::Pending);
            if pending {
                state.links.remove(&link_id);
            }
        }
    }

    /// All links owned by `guardian`, any status (dashboard family view)
    #[must_use]
    pub fn links_of(&self, guardian: GuardianId) -> Vec<GuardianLink> {
        let state = self.inner.lock();
        state
            .links
            .values()
            .filter(|l| l.guardian == Some(guardian))
            .cloned()
            .collect()
    }

    /// Fetch one link by id
    #[must_use]
    pub fn link(&self, link_id: LinkId) -> Option<GuardianLink> {
        self.inner.lock().links.get(&link_id).cloned()
    }
}

impl LinkDirectory for GuardianRegistry {
    fn has_active_link(&self, guardian: GuardianId, learner: LearnerId) -> bool {
        self.inner.lock().has_active_pair(guardian, learner)
    }

    fn linked_learners(&self, guardian: GuardianId) -> Vec<LearnerId> {
        let state = self.inner.lock();
        state
            .links
            .values()
            .filter(|l| l.is_active() && l.guardian == Some(guardian))
            .map(|l| l.learner)
            .collect()
    }
}

fn under_threshold(declared_age: Option<u8>, threshold: u8) -> bool {
    matches!(declared_age, Some(age) if age < threshold)
}

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTVWXYZ23456789";

fn generate_code(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_types::FixedSeatPlan;

    fn registry(ceiling: u32) -> GuardianRegistry {
        GuardianRegistry::new(LinkPolicy::default(), Arc::new(FixedSeatPlan::new(ceiling)))
    }

    #[test]
    fn code_shape() {
        let code = generate_code(8);
        assert_eq!(code.len(), 8);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn redeem_activates_link() {
        let reg = registry(2);
        let learner = LearnerId::new();
        let guardian = GuardianId::new();
        let issued = reg.issue_code(learner, Some(15));

        let link = reg
            .redeem(&issued.code, guardian, Some("mother".into()), false)
            .unwrap();
        assert_eq!(link.status, LinkStatus::Active);
        assert_eq!(link.guardian, Some(guardian));
        assert!(link.accepted_at.is_some());
        assert!(reg.has_active_link(guardian, learner));
    }

    #[test]
    fn codes_are_single_use() {
        let reg = registry(5);
        let issued = reg.issue_code(LearnerId::new(), None);
        reg.redeem(&issued.code, GuardianId::new(), None, false)
            .unwrap();
        assert_eq!(
            reg.redeem(&issued.code, GuardianId::new(), None, false),
            Err(LinkError::InvalidCode)
        );
    }

    #[test]
    fn unknown_code_rejected() {
        let reg = registry(5);
        assert_eq!(
            reg.redeem("NOPE1234", GuardianId::new(), None, false),
            Err(LinkError::InvalidCode)
        );
    }

    #[test]
    fn under_13_requires_consent() {
        let reg = registry(5);
        let guardian = GuardianId::new();
        let issued = reg.issue_code(LearnerId::new(), Some(9));

        assert_eq!(
            reg.redeem(&issued.code, guardian, None, false),
            Err(LinkError::ConsentRequired { threshold: 13 })
        );
        // Refusal must not consume the code.
        let link = reg.redeem(&issued.code, guardian, None, true).unwrap();
        assert_eq!(link.metadata.get("consent_attested").unwrap(), "true");
    }

    #[test]
    fn seat_ceiling_enforced() {
        let reg = registry(1);
        let guardian = GuardianId::new();
        let first = reg.issue_code(LearnerId::new(), None);
        reg.redeem(&first.code, guardian, None, false).unwrap();

        let second = reg.issue_code(LearnerId::new(), None);
        assert_eq!(
            reg.redeem(&second.code, guardian, None, false),
            Err(LinkError::SeatLimitReached { ceiling: 1 })
        );
        assert_eq!(reg.linked_learners(guardian).len(), 1);
    }

    #[test]
    fn duplicate_pair_rejected() {
        let reg = registry(5);
        let guardian = GuardianId::new();
        let learner = LearnerId::new();
        let first = reg.issue_code(learner, None);
        reg.redeem(&first.code, guardian, None, false).unwrap();

        let second = reg.issue_code(learner, None);
        assert_eq!(
            reg.redeem(&second.code, guardian, None, false),
            Err(LinkError::AlreadyLinked)
        );
    }

    #[test]
    fn revoke_is_owner_only() {
        let reg = registry(5);
        let guardian = GuardianId::new();
        let issued = reg.issue_code(LearnerId::new(), None);
        let link = reg.redeem(&issued.code, guardian, None, false).unwrap();

        assert_eq!(
            reg.revoke(link.id, GuardianId::new()),
            Err(LinkError::Unauthorized)
        );
        reg.revoke(link.id, guardian).unwrap();
        assert!(!reg.has_active_link(guardian, link.learner));
    }

    #[test]
    fn eviction_drops_expired_codes_and_their_invitations() {
        let reg = registry(5);
        let expired = reg.issue_code(LearnerId::new(), None);
        let redeemed = reg.issue_code(LearnerId::new(), None);
        reg.redeem(&redeemed.code, GuardianId::new(), None, false)
            .unwrap();

        reg.evict_expired_at(unix_now() + LinkPolicy::default().code_ttl_secs + 1);

        // The unredeemed invitation and its code are gone; the active
        // link survives its consumed code.
        assert!(reg.link(expired.link_id).is_none());
        assert_eq!(
            reg.link(redeemed.link_id).unwrap().status,
            LinkStatus::Active
        );
        let state = reg.inner.lock();
        assert!(state.codes.is_empty());
        assert_eq!(state.links.len(), 1);
    }

    #[test]
    fn revoked_seat_is_freed() {
        let reg = registry(1);
        let guardian = GuardianId::new();
        let first = reg.issue_code(LearnerId::new(), None);
        let link = reg.redeem(&first.code, guardian, None, false).unwrap();
        reg.revoke(link.id, guardian).unwrap();

        let second = reg.issue_code(LearnerId::new(), None);
        assert!(reg.redeem(&second.code, guardian, None, false).is_ok());
    }
}
