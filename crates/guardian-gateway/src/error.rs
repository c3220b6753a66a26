//! Gateway errors

/// Failures of the safety gateway. All are fail-closed: nothing reaches
/// the model, the caller, or storage when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// One of the two ceilings denied the attempt
    #[error("rate limited; retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until the current window resets
        retry_after_secs: u64,
    },

    /// Sanitization reduced the prompt below the minimum viable size
    #[error("message blocked: content was removed by sanitization")]
    BlockedContent,

    /// The upstream model did not answer within the bounded timeout.
    /// The rate-limit increment from admission is not refunded.
    #[error("tutor service timed out")]
    UpstreamTimeout,

    /// The upstream model failed outright
    #[error("tutor service failed: {0}")]
    Upstream(String),

    /// The caller disconnected before the response could be delivered
    #[error("caller disconnected")]
    Cancelled,
}
