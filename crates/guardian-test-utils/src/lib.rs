//! Testing utilities for the guardian pipeline workspace
//!
//! Shared fixtures: pre-linked families, ledgers, recording audit sinks,
//! and fake tutor models.

#![allow(missing_docs)]

use async_trait::async_trait;
use guardian_gateway::{GatewayError, TutorModel};
use guardian_ledger::{
    AuditEntry, AuditSink, ConcernCategory, NewConcernReport, NewPrivacyRequest,
    PrivacyRequestKind, RequestLedger,
};
use guardian_links::{GuardianRegistry, LinkPolicy};
use guardian_types::{FixedSeatPlan, GuardianId, IdentitySalt, LearnerId, Requester};
use parking_lot::Mutex;
use std::sync::{Arc, Once};
use std::time::Duration;

static TRACING: Once = Once::new();

/// Install a fmt subscriber honoring `RUST_LOG` for test runs; safe to
/// call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A guardian with `learners.len()` active links in `registry`
pub struct LinkedFamily {
    pub guardian: GuardianId,
    pub learners: Vec<LearnerId>,
    pub registry: Arc<GuardianRegistry>,
}

/// Build a registry holding one guardian actively linked to `linked`
/// learners, under a plan with `ceiling` seats.
pub fn linked_family(linked: usize, ceiling: u32) -> LinkedFamily {
    let registry = Arc::new(GuardianRegistry::new(
        LinkPolicy::default(),
        Arc::new(FixedSeatPlan::new(ceiling)),
    ));
    let guardian = GuardianId::new();
    let learners: Vec<LearnerId> = (0..linked)
        .map(|_| {
            let learner = LearnerId::new();
            let code = registry.issue_code(learner, Some(15));
            registry
                .redeem(&code.code, guardian, Some("parent".into()), false)
                .expect("fixture redemption");
            learner
        })
        .collect();
    LinkedFamily {
        guardian,
        learners,
        registry,
    }
}

/// Audit sink that captures every notified entry
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }
}

impl AuditSink for RecordingSink {
    fn notify(&self, entry: &AuditEntry) {
        self.entries.lock().push(entry.clone());
    }
}

/// Ledger over a family's registry with a recording sink
pub fn ledger_over(family: &LinkedFamily) -> (Arc<RequestLedger>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let ledger = Arc::new(RequestLedger::new(
        Arc::clone(&family.registry) as Arc<_>,
        Arc::clone(&sink) as Arc<_>,
    ));
    (ledger, sink)
}

/// Deterministic test salt
pub fn test_salt() -> IdentitySalt {
    IdentitySalt::new(*b"guardian-test-salt")
}

pub fn export_request(guardian: GuardianId, learner: LearnerId) -> NewPrivacyRequest {
    NewPrivacyRequest {
        requester: Requester::Guardian(guardian),
        learner,
        kind: PrivacyRequestKind::Export,
        contact_email: None,
        reason: None,
    }
}

pub fn concern_report(guardian: GuardianId, category: ConcernCategory) -> NewConcernReport {
    NewConcernReport {
        requester: Requester::Guardian(guardian),
        learner: None,
        category,
        description: "something looked wrong".to_string(),
        contact_email: None,
        screenshot_url: None,
    }
}

/// Tutor model that echoes the prompt back
pub struct EchoTutor;

#[async_trait]
impl TutorModel for EchoTutor {
    async fn reply(&self, prompt: &str) -> Result<String, GatewayError> {
        Ok(format!("echo: {prompt}"))
    }
}

/// Tutor model that answers after a fixed delay
pub struct SlowTutor {
    pub delay: Duration,
}

#[async_trait]
impl TutorModel for SlowTutor {
    async fn reply(&self, _prompt: &str) -> Result<String, GatewayError> {
        tokio::time::sleep(self.delay).await;
        Ok("late answer".to_string())
    }
}

/// Tutor model that always fails
pub struct FailingTutor;

#[async_trait]
impl TutorModel for FailingTutor {
    async fn reply(&self, _prompt: &str) -> Result<String, GatewayError> {
        Err(GatewayError::Upstream("fake outage".to_string()))
    }
}
