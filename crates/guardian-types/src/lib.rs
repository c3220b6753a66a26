//! Shared contracts for the guardian trust & compliance pipeline
//!
//! Leaf crate with no internal dependencies:
//! - Newtype identifiers for guardians, learners, links, and requests
//! - The salted identity-hashing convention shared by the ledger and the
//!   safety gateway
//! - Capability seams (seat ceilings, link lookups) implemented by the
//!   registry and consumed by the ledger

pub mod capability;
pub mod identity;
pub mod ids;
pub mod time;

pub use capability::{FixedSeatPlan, LinkDirectory, SeatCapability};
pub use identity::{IdentityHash, IdentitySalt};
pub use ids::{GuardianId, LearnerId, LinkId, RequestId, Requester, ReviewerId};
pub use time::unix_now;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
