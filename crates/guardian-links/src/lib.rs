//! Guardian Link Registry
//!
//! Issues and redeems linking codes between a guardian identity and a
//! minor's account:
//! - Short, unguessable, single-use codes with a TTL
//! - Plan-derived seat ceilings enforced atomically with link creation
//! - Consent attestation required for under-13 learners
//! - Revocation with owner-only access

pub mod error;
pub mod policy;
pub mod registry;

pub use error::LinkError;
pub use policy::LinkPolicy;
pub use registry::{GuardianLink, GuardianRegistry, LinkStatus, LinkingCode};
