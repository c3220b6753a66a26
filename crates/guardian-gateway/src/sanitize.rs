//! Sanitization filter
//!
//! Pure, deterministic redaction applied to outbound prompts and inbound
//! model responses. Passes are order-independent and idempotent: once a
//! pattern is removed it cannot reappear, so `sanitize(sanitize(x)) ==
//! sanitize(x)` holds for all inputs.

use crate::config::SanitizePolicy;
use once_cell::sync::Lazy;
use regex::Regex;

/// Replacement marker. Contains no digits, so no redaction pass can match
/// inside it.
pub const REDACTED: &str = "[redacted]";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("email pattern")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?[0-9][0-9()\-\s.]{6,}[0-9]").expect("phone pattern"));

/// Runs of 8+ alphanumerics; only those containing a digit are treated as
/// identifier-shaped (plain words stay readable).
static LONG_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9]{8,}\b").expect("token pattern"));

/// Redact email, phone, and long-identifier patterns from one text
#[must_use]
pub fn sanitize_text(text: &str) -> String {
    let text = EMAIL_RE.replace_all(text, REDACTED);
    let text = PHONE_RE.replace_all(&text, REDACTED);
    let text = LONG_TOKEN_RE.replace_all(&text, |caps: &regex::Captures<'_>| {
        let token = &caps[0];
        if token.bytes().any(|b| b.is_ascii_digit()) {
            REDACTED.to_string()
        } else {
            token.to_string()
        }
    });
    text.into_owned()
}

/// A sanitized, size-capped conversation transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedTranscript {
    /// Remaining turns, oldest first, each redacted
    pub turns: Vec<String>,
    /// How many oldest turns were dropped to fit the context cap
    pub dropped_turns: usize,
}

impl SanitizedTranscript {
    /// Total size in characters
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.turns.iter().map(|t| t.chars().count()).sum()
    }

    /// Size in characters excluding redaction markers and surrounding
    /// whitespace. A prompt that was entirely PII measures zero here.
    #[must_use]
    pub fn meaningful_chars(&self) -> usize {
        self.turns
            .iter()
            .map(|t| t.replace(REDACTED, "").trim().chars().count())
            .sum()
    }

    /// The transcript as one prompt payload
    #[must_use]
    pub fn joined(&self) -> String {
        self.turns.join("\n")
    }
}

/// Redact every turn, then drop oldest turns until the transcript fits
/// the context cap. The newest turn is always kept, truncated from the
/// front if it alone exceeds the cap.
#[must_use]
pub fn sanitize_transcript(policy: &SanitizePolicy, turns: &[String]) -> SanitizedTranscript {
    let mut sanitized: Vec<String> = turns.iter().map(|t| sanitize_text(t)).collect();

    let mut dropped = 0;
    let mut total: usize = sanitized.iter().map(|t| t.chars().count()).sum();
    while total > policy.max_context_chars && sanitized.len() > 1 {
        let removed = sanitized.remove(0);
        total -= removed.chars().count();
        dropped += 1;
    }
    if let Some(last) = sanitized.last_mut() {
        let len = last.chars().count();
        if len > policy.max_context_chars {
            let skip = len - policy.max_context_chars;
            *last = last.chars().skip(skip).collect();
        }
    }

    SanitizedTranscript {
        turns: sanitized,
        dropped_turns: dropped,
    }
}
