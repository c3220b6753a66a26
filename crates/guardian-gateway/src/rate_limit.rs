//! Fixed-window rate limiter
//!
//! Counters are keyed by salted identity hashes and live in a sharded
//! concurrent map. `check` performs read-or-initialize, window reset, and
//! increment under the map's per-key entry lock, so two concurrent callers
//! can never both take the last slot of a window.

use dashmap::DashMap;
use guardian_types::{unix_now, IdentityHash};

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Admitted; `remaining` slots left in the current window
    Allowed {
        /// Slots left after this increment
        remaining: u32,
    },
    /// Denied; the current window resets in `retry_after_secs`
    Limited {
        /// Seconds until the window rolls over
        retry_after_secs: u64,
    },
}

impl RateDecision {
    /// Whether the attempt was admitted
    #[inline]
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    window_start: u64,
    count: u32,
}

/// Fixed wall-clock window counter store.
///
/// Windows are aligned to multiples of the window length; a request
/// straddling a boundary counts against whichever window is current at
/// increment time. Counters have no durability requirement and can be
/// evicted after expiry.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    ceiling: u32,
    window_secs: u64,
    counters: DashMap<IdentityHash, WindowCounter>,
}

impl FixedWindowLimiter {
    /// Create a limiter with the given ceiling and window length
    #[must_use]
    pub fn new(ceiling: u32, window_secs: u64) -> Self {
        Self {
            ceiling,
            window_secs: window_secs.max(1),
            counters: DashMap::new(),
        }
    }

    /// Atomically admit-or-deny one attempt for an identity
    pub fn check(&self, identity: IdentityHash) -> RateDecision {
        self.check_at(identity, unix_now())
    }

    /// Admission check against an explicit clock (tests drive this)
    pub fn check_at(&self, identity: IdentityHash, now: u64) -> RateDecision {
        let window_start = now - (now % self.window_secs);
        let mut entry = self.counters.entry(identity).or_insert(WindowCounter {
            window_start,
            count: 0,
        });

        if entry.window_start != window_start {
            // Window elapsed: reset atomically under the entry lock.
            entry.window_start = window_start;
            entry.count = 0;
        }

        if entry.count < self.ceiling {
            entry.count += 1;
            RateDecision::Allowed {
                remaining: self.ceiling - entry.count,
            }
        } else {
            let retry_after_secs = entry.window_start + self.window_secs - now;
            tracing::debug!(%identity, retry_after_secs, "rate limited");
            RateDecision::Limited { retry_after_secs }
        }
    }

    /// Drop counters whose window has elapsed
    pub fn evict_expired(&self) {
        self.evict_expired_at(unix_now());
    }

    /// Eviction against an explicit clock
    pub fn evict_expired_at(&self, now: u64) {
        let window_start = now - (now % self.window_secs);
        self.counters.retain(|_, c| c.window_start == window_start);
    }

    /// Number of live counters (monitoring)
    #[must_use]
    pub fn tracked_identities(&self) -> usize {
        self.counters.len()
    }
}
