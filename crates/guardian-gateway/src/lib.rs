//! AI Safety Gateway
//!
//! Wraps every tutor interaction in rate limiting and PII sanitization:
//! - Fixed-window counters keyed by salted identity hashes, per learner
//!   and per origin, both enforced on every attempt
//! - Deterministic, idempotent redaction of emails, phone numbers, and
//!   long identifier tokens, with oldest-turn-first truncation
//! - Bounded upstream timeout and strict fail-closed behavior: no
//!   partially sanitized content is ever forwarded
//!
//! The gateway never touches the request ledger but shares its salted
//! identity-hashing convention.

pub mod config;
pub mod error;
pub mod gateway;
pub mod rate_limit;
pub mod sanitize;

pub use config::{GatewayConfig, RateLimitPolicy, SanitizePolicy};
pub use error::GatewayError;
pub use gateway::{CancelFlag, ChatReply, ChatRequest, SafetyGateway, TutorModel};
pub use rate_limit::{FixedWindowLimiter, RateDecision};
pub use sanitize::{sanitize_text, sanitize_transcript, SanitizedTranscript};
