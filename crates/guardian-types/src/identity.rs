//! Salted identity hashing
//!
//! The rate limiter and the ledger share one convention for turning a
//! learner id or an origin address into an opaque counter key. Hashes are
//! salted so stored counters never contain a raw identifier.

use crate::ids::LearnerId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Opaque, salted identity hash used as a counter key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityHash(pub [u8; 32]);

impl std::fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Installation-wide hashing salt.
///
/// All components of one deployment must share the same salt so counters
/// keyed in one process match counters keyed in another.
#[derive(Debug, Clone)]
pub struct IdentitySalt(Vec<u8>);

impl IdentitySalt {
    /// Create a salt from raw bytes
    #[inline]
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Hash a learner identity
    #[must_use]
    pub fn hash_learner(&self, learner: LearnerId) -> IdentityHash {
        self.hash_domain(b"learner", learner.0.as_bytes())
    }

    /// Hash an origin address (IP or forwarded-for value)
    #[must_use]
    pub fn hash_origin(&self, origin: &str) -> IdentityHash {
        self.hash_domain(b"origin", origin.as_bytes())
    }

    fn hash_domain(&self, domain: &[u8], value: &[u8]) -> IdentityHash {
        let mut hasher = Sha256::new();
        hasher.update(&self.0);
        hasher.update([0]);
        hasher.update(domain);
        hasher.update([0]);
        hasher.update(value);
        IdentityHash(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_hash() {
        let salt = IdentitySalt::new(*b"test-salt");
        let learner = LearnerId::new();
        assert_eq!(salt.hash_learner(learner), salt.hash_learner(learner));
    }

    #[test]
    fn domains_are_separated() {
        let salt = IdentitySalt::new(*b"test-salt");
        let learner = LearnerId::new();
        let as_origin = salt.hash_origin(&learner.0.to_string());
        assert_ne!(salt.hash_learner(learner), as_origin);
    }

    #[test]
    fn salt_changes_hash() {
        let learner = LearnerId::new();
        let a = IdentitySalt::new(*b"salt-a").hash_learner(learner);
        let b = IdentitySalt::new(*b"salt-b").hash_learner(learner);
        assert_ne!(a, b);
    }
}
