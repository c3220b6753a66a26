//! Gateway policy configuration
//!
//! Defaults mirror product policy (12 per 5 minutes per learner, 30 per
//! 5 minutes per origin); deployments override them, they are not design
//! constants.

use serde::{Deserialize, Serialize};

/// Fixed-window ceilings for tutor traffic
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    /// Ceiling per learner identity per window
    pub learner_ceiling: u32,
    /// Ceiling per origin identity per window
    pub origin_ceiling: u32,
    /// Window length in seconds (wall-clock fixed, not sliding)
    pub window_secs: u64,
}

impl RateLimitPolicy {
    /// Create the default policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a custom per-learner ceiling
    #[inline]
    #[must_use]
    pub fn with_learner_ceiling(mut self, ceiling: u32) -> Self {
        self.learner_ceiling = ceiling;
        self
    }

    /// With a custom per-origin ceiling
    #[inline]
    #[must_use]
    pub fn with_origin_ceiling(mut self, ceiling: u32) -> Self {
        self.origin_ceiling = ceiling;
        self
    }

    /// With a custom window length
    #[inline]
    #[must_use]
    pub fn with_window_secs(mut self, secs: u64) -> Self {
        self.window_secs = secs;
        self
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            learner_ceiling: 12,
            origin_ceiling: 30,
            window_secs: 5 * 60,
        }
    }
}

/// Sanitization sizing policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SanitizePolicy {
    /// Maximum total transcript size in characters; oldest turns are
    /// dropped first to fit
    pub max_context_chars: usize,
    /// A sanitized prompt below this size fails closed as blocked content
    pub min_viable_chars: usize,
}

impl SanitizePolicy {
    /// Create the default policy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a custom context cap
    #[inline]
    #[must_use]
    pub fn with_max_context_chars(mut self, max: usize) -> Self {
        self.max_context_chars = max;
        self
    }

    /// With a custom minimum viable prompt size
    #[inline]
    #[must_use]
    pub fn with_min_viable_chars(mut self, min: usize) -> Self {
        self.min_viable_chars = min;
        self
    }
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            max_context_chars: 6_000,
            min_viable_chars: 8,
        }
    }
}

/// Full gateway configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Rate-limit ceilings
    pub rate: RateLimitPolicy,
    /// Sanitization sizing
    pub sanitize: SanitizePolicy,
    /// Bounded upstream model timeout in seconds
    pub upstream_timeout_secs: u64,
}

impl GatewayConfig {
    /// Create the default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a custom rate policy
    #[inline]
    #[must_use]
    pub fn with_rate(mut self, rate: RateLimitPolicy) -> Self {
        self.rate = rate;
        self
    }

    /// With a custom sanitize policy
    #[inline]
    #[must_use]
    pub fn with_sanitize(mut self, sanitize: SanitizePolicy) -> Self {
        self.sanitize = sanitize;
        self
    }

    /// With a custom upstream timeout
    #[inline]
    #[must_use]
    pub fn with_upstream_timeout_secs(mut self, secs: u64) -> Self {
        self.upstream_timeout_secs = secs;
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            rate: RateLimitPolicy::default(),
            sanitize: SanitizePolicy::default(),
            upstream_timeout_secs: 30,
        }
    }
}
