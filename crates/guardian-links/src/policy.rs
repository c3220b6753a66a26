//! Link registry policy configuration

use serde::{Deserialize, Serialize};

/// Tunable policy for code issuance and consent gating
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkPolicy {
    /// Linking-code time-to-live in seconds
    pub code_ttl_secs: u64,
    /// Linking-code length in characters
    pub code_length: usize,
    /// Learners whose declared age is below this require guardian consent
    pub consent_age_threshold: u8,
}

impl LinkPolicy {
    /// Create the default policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a custom code TTL
    #[inline]
    #[must_use]
    pub fn with_code_ttl_secs(mut self, secs: u64) -> Self {
        self.code_ttl_secs = secs;
        self
    }

    /// With a custom code length
    #[inline]
    #[must_use]
    pub fn with_code_length(mut self, length: usize) -> Self {
        self.code_length = length;
        self
    }
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            code_ttl_secs: 15 * 60,
            code_length: 8,
            consent_age_threshold: 13,
        }
    }
}
