//! Link registry errors

/// Failures of linking-code issuance, redemption, and revocation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Code is unknown, expired, or already consumed
    #[error("invalid or expired linking code")]
    InvalidCode,

    /// Learner is under the consent age threshold and the guardian did not
    /// attest consent
    #[error("guardian consent attestation required for learners under {threshold}")]
    ConsentRequired {
        /// Policy age threshold in years
        threshold: u8,
    },

    /// Guardian is at or over their plan's seat ceiling
    #[error("seat limit reached ({ceiling} active links)")]
    SeatLimitReached {
        /// The plan-derived ceiling that was hit
        ceiling: u32,
    },

    /// Guardian already holds an active link to this learner
    #[error("guardian is already linked to this learner")]
    AlreadyLinked,

    /// Caller does not own the link they are operating on
    #[error("caller does not own this link")]
    Unauthorized,

    /// Link id does not exist
    #[error("link not found")]
    LinkNotFound,
}
