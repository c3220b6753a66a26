//! Safety gateway composition
//!
//! Order of operations per exchange: identity hashing, both rate checks,
//! outbound sanitization, bounded upstream call, inbound sanitization.
//! Failure at any step is fail-closed; a timeout still consumes quota so
//! retry storms stay bounded.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::rate_limit::{FixedWindowLimiter, RateDecision};
use crate::sanitize::{sanitize_text, sanitize_transcript};
use async_trait::async_trait;
use guardian_types::{IdentitySalt, LearnerId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The upstream AI tutor model. The model call itself is out of scope;
/// implementations adapt whatever transport the deployment uses.
#[async_trait]
pub trait TutorModel: Send + Sync {
    /// Send a sanitized prompt and return the raw model reply
    async fn reply(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// One tutor exchange request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The learner sending the message
    pub learner: LearnerId,
    /// Origin address of the caller (IP or forwarded-for value)
    pub origin: String,
    /// Conversation turns, oldest first; the last turn is the new message
    pub turns: Vec<String>,
}

/// A delivered, sanitized tutor reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// The sanitized model response
    pub text: String,
    /// Oldest turns dropped from the outbound transcript to fit context
    pub dropped_turns: usize,
}

/// Caller-disconnect flag, set by the transport layer when the client
/// goes away. Checked best-effort; an in-flight upstream call is not
/// cancelled, but its response is never sanitized or delivered.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create an unset flag
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the caller as disconnected
    #[inline]
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    /// Whether the caller has disconnected
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }
}

/// Composes the rate limiter and sanitization filter around every tutor
/// interaction
pub struct SafetyGateway {
    config: GatewayConfig,
    salt: IdentitySalt,
    learner_limiter: FixedWindowLimiter,
    origin_limiter: FixedWindowLimiter,
    model: Arc<dyn TutorModel>,
}

impl SafetyGateway {
    /// Create a gateway over an upstream model
    #[must_use]
    pub fn new(config: GatewayConfig, salt: IdentitySalt, model: Arc<dyn TutorModel>) -> Self {
        Self {
            learner_limiter: FixedWindowLimiter::new(
                config.rate.learner_ceiling,
                config.rate.window_secs,
            ),
            origin_limiter: FixedWindowLimiter::new(
                config.rate.origin_ceiling,
                config.rate.window_secs,
            ),
            config,
            salt,
            model,
        }
    }

    /// Run one tutor exchange end to end.
    ///
    /// Both counters increment on every attempt, even when only one
    /// ceiling denies it.
    ///
    /// # Errors
    /// - [`GatewayError::RateLimited`] if either ceiling denies the attempt
    /// - [`GatewayError::BlockedContent`] if sanitization leaves less than
    ///   the minimum viable prompt
    /// - [`GatewayError::UpstreamTimeout`] / [`GatewayError::Upstream`] for
    ///   upstream failures (quota is not refunded)
    /// - [`GatewayError::Cancelled`] if the caller disconnected
    pub async fn exchange(
        &self,
        request: ChatRequest,
        cancel: &CancelFlag,
    ) -> Result<ChatReply, GatewayError> {
        let learner_hash = self.salt.hash_learner(request.learner);
        let origin_hash = self.salt.hash_origin(&request.origin);

        // Both checks run unconditionally so both counters always
        // increment, whichever one denies.
        let learner_decision = self.learner_limiter.check(learner_hash);
        let origin_decision = self.origin_limiter.check(origin_hash);
        if let Some(retry_after_secs) = retry_after(learner_decision, origin_decision) {
            tracing::info!(learner = %request.learner, "tutor exchange rate limited");
            return Err(GatewayError::RateLimited { retry_after_secs });
        }

        let transcript = sanitize_transcript(&self.config.sanitize, &request.turns);
        if transcript.meaningful_chars() < self.config.sanitize.min_viable_chars {
            tracing::info!(learner = %request.learner, "tutor exchange blocked: prompt emptied by sanitization");
            return Err(GatewayError::BlockedContent);
        }
        let prompt = transcript.joined();

        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        let timeout = Duration::from_secs(self.config.upstream_timeout_secs);
        let raw = match tokio::time::timeout(timeout, self.model.reply(&prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(learner = %request.learner, error = %e, "upstream tutor failure");
                return Err(e);
            }
            Err(_) => {
                tracing::warn!(learner = %request.learner, "upstream tutor timeout");
                return Err(GatewayError::UpstreamTimeout);
            }
        };

        // Best-effort skip: never sanitize or deliver a response for a
        // caller that has disconnected.
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        Ok(ChatReply {
            text: sanitize_text(&raw),
            dropped_turns: transcript.dropped_turns,
        })
    }

    /// Drop expired counters from both limiters
    pub fn evict_expired(&self) {
        self.learner_limiter.evict_expired();
        self.origin_limiter.evict_expired();
    }
}

fn retry_after(learner: RateDecision, origin: RateDecision) -> Option<u64> {
    let secs = |d: RateDecision| match d {
        RateDecision::Limited { retry_after_secs } => Some(retry_after_secs),
        RateDecision::Allowed { .. } => None,
    };
    match (secs(learner), secs(origin)) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_takes_the_longer_wait() {
        let limited = |s| RateDecision::Limited { retry_after_secs: s };
        let allowed = RateDecision::Allowed { remaining: 1 };
        assert_eq!(retry_after(limited(10), limited(40)), Some(40));
        assert_eq!(retry_after(limited(10), allowed), Some(10));
        assert_eq!(retry_after(allowed, allowed), None);
    }

    #[test]
    fn cancel_flag_round_trip() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());
        flag.cancel();
        assert!(flag.is_cancelled());
    }
}
