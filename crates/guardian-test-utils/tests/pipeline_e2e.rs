//! End-to-end pipeline walk: link a family, report a concern, cascade a
//! deletion, and run a tutor exchange through the gateway.

use guardian_gateway::{CancelFlag, ChatRequest, GatewayConfig, SafetyGateway};
use guardian_ledger::{
    ConcernCategory, DeletionOrchestrator, DeletionScope, DeletionStatus, NewDeletionRequest,
    PrivacyStatus, RequestFilter, TriageRoute,
};
use guardian_test_utils::{
    concern_report, init_tracing, ledger_over, linked_family, test_salt, EchoTutor,
};
use guardian_types::ReviewerId;
use std::collections::BTreeSet;
use std::sync::Arc;

#[test]
fn report_then_cascading_deletion() {
    init_tracing();
    let family = linked_family(2, 3);
    let (ledger, sink) = ledger_over(&family);
    let reviewer = ReviewerId::new();

    // A worried parent files a safety concern.
    let report = ledger
        .submit_report(concern_report(family.guardian, ConcernCategory::Safety))
        .unwrap();
    assert_eq!(report.route, TriageRoute::Trust);

    // Later they ask to delete everything, children included.
    let deletion = ledger
        .submit_deletion(NewDeletionRequest {
            requester: family.guardian,
            scope: DeletionScope::ParentAndStudents,
            include_learners: family.learners.iter().copied().collect::<BTreeSet<_>>(),
            confirmed: true,
            reason: Some("leaving the platform".into()),
            contact_email: None,
        })
        .unwrap();
    ledger
        .transition_deletion(deletion.id, DeletionStatus::Accepted, reviewer)
        .unwrap();

    let outcomes = DeletionOrchestrator::new(Arc::clone(&ledger))
        .execute(deletion.id)
        .unwrap();
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.result.is_ok()));

    // Each cascaded erasure runs the normal review lifecycle.
    let erasures = ledger.list_privacy(&RequestFilter::any());
    assert_eq!(erasures.len(), 2);
    let first = erasures[0].id;
    ledger
        .transition_privacy(first, PrivacyStatus::InReview, reviewer, None)
        .unwrap();
    let done = ledger
        .transition_privacy(first, PrivacyStatus::Fulfilled, reviewer, None)
        .unwrap();
    assert!(done.resolved_at.is_some());

    // Everything that happened is on the chain and was notified.
    assert!(ledger.audit().verify_integrity());
    let entries = sink.entries();
    assert_eq!(ledger.audit().entries().len(), entries.len());
    assert!(entries.iter().any(|e| e.action == "transition"));
}

#[tokio::test]
async fn tutor_exchange_round_trip() {
    let family = linked_family(1, 3);
    let gateway = SafetyGateway::new(GatewayConfig::default(), test_salt(), Arc::new(EchoTutor));

    let reply = gateway
        .exchange(
            ChatRequest {
                learner: family.learners[0],
                origin: "198.51.100.4".to_string(),
                turns: vec!["my email is kid@example.com, what is 2/3 + 1/6?".to_string()],
            },
            &CancelFlag::new(),
        )
        .await
        .unwrap();

    // The prompt reached the model already sanitized.
    assert!(reply.text.starts_with("echo: "));
    assert!(!reply.text.contains("example.com"));
}
