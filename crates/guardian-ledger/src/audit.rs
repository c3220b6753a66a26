//! Hash-chained audit trail
//!
//! Every successful submit and transition appends an entry carrying actor,
//! timestamp, and before/after state. Entries chain through sha256 so
//! tampering with history is detectable.

use guardian_types::{unix_now, RequestId, Requester, ReviewerId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Who performed a ledger mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// The submitting guardian or learner
    Requester(Requester),
    /// A staff reviewer
    Reviewer(ReviewerId),
    /// The deletion orchestrator
    System,
}

/// One audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entry_id: Uuid,
    pub timestamp: u64,
    pub actor: Actor,
    pub record: RequestId,
    /// "submit" or "transition"
    pub action: String,
    /// State before the mutation, absent for submits
    pub before: Option<String>,
    /// State after the mutation
    pub after: String,
    pub prev_hash: [u8; 32],
    pub hash: [u8; 32],
}

impl AuditEntry {
    /// Build an unchained entry; the log fills in the chain on append
    #[must_use]
    pub fn new(
        actor: Actor,
        record: RequestId,
        action: impl Into<String>,
        before: Option<String>,
        after: impl Into<String>,
    ) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            timestamp: unix_now(),
            actor,
            record,
            action: action.into(),
            before,
            after: after.into(),
            prev_hash: [0u8; 32],
            hash: [0u8; 32],
        }
    }
}

/// External notification seam (email notifier, ops webhook).
///
/// Delivery is out of scope for the pipeline; the default sink emits a
/// tracing event.
pub trait AuditSink: Send + Sync {
    /// Called after an entry has been appended to the chain
    fn notify(&self, entry: &AuditEntry);
}

/// Default sink: structured tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn notify(&self, entry: &AuditEntry) {
        tracing::info!(
            record = %entry.record,
            action = %entry.action,
            before = ?entry.before,
            after = %entry.after,
            "audit entry appended"
        );
    }
}

/// Append-only, hash-chained audit log
#[derive(Debug, Default)]
pub struct AuditLog {
    inner: Mutex<Vec<AuditEntry>>,
}

impl AuditLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, chaining it to the previous one
    pub fn append(&self, mut entry: AuditEntry) -> AuditEntry {
        let mut guard = self.inner.lock();
        entry.prev_hash = guard.last().map(|e| e.hash).unwrap_or([0u8; 32]);
        entry.hash = compute_hash(&entry);
        guard.push(entry.clone());
        entry
    }

    /// Snapshot of all entries in append order
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.inner.lock().clone()
    }

    /// Entries touching one record
    #[must_use]
    pub fn entries_for(&self, record: RequestId) -> Vec<AuditEntry> {
        self.inner
            .lock()
            .iter()
            .filter(|e| e.record == record)
            .cloned()
            .collect()
    }

    /// Verify the whole chain; `false` means history was tampered with
    #[must_use]
    pub fn verify_integrity(&self) -> bool {
        let guard = self.inner.lock();
        let mut prev = [0u8; 32];
        for e in guard.iter() {
            if e.prev_hash != prev || e.hash != compute_hash(e) {
                return false;
            }
            prev = e.hash;
        }
        true
    }
}

fn compute_hash(entry: &AuditEntry) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(entry.entry_id.as_bytes());
    hasher.update(entry.timestamp.to_le_bytes());
    hasher.update(actor_bytes(&entry.actor));
    hasher.update(entry.record.0.as_bytes());
    hasher.update(entry.action.as_bytes());
    hasher.update([0]);
    if let Some(before) = &entry.before {
        hasher.update(before.as_bytes());
    }
    hasher.update([0]);
    hasher.update(entry.after.as_bytes());
    hasher.update([0]);
    hasher.update(entry.prev_hash);
    hasher.finalize().into()
}

fn actor_bytes(actor: &Actor) -> Vec<u8> {
    match actor {
        Actor::Requester(Requester::Guardian(g)) => {
            let mut v = vec![1u8];
            v.extend_from_slice(g.0.as_bytes());
            v
        }
        Actor::Requester(Requester::Learner(l)) => {
            let mut v = vec![2u8];
            v.extend_from_slice(l.0.as_bytes());
            v
        }
        Actor::Reviewer(r) => {
            let mut v = vec![3u8];
            v.extend_from_slice(r.0.as_bytes());
            v
        }
        Actor::System => vec![4u8],
    }
}
