use guardian_ledger::{
    ConcernCategory, DeletionScope, DeletionStatus, LedgerError, NewDeletionRequest,
    NewPrivacyRequest, PrivacyRequestKind, PrivacyStatus, TriageRoute,
};
use guardian_test_utils::{concern_report, export_request, ledger_over, linked_family};
use guardian_types::{GuardianId, LearnerId, Requester, ReviewerId};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::thread;

#[test]
fn linked_guardian_can_submit() {
    let family = linked_family(1, 3);
    let (ledger, sink) = ledger_over(&family);

    let record = ledger
        .submit_privacy(export_request(family.guardian, family.learners[0]))
        .unwrap();
    assert_eq!(record.status, PrivacyStatus::Pending);
    assert_eq!(sink.entries().len(), 1);
    assert_eq!(sink.entries()[0].action, "submit");
}

#[test]
fn unlinked_guardian_is_unauthorized() {
    let family = linked_family(1, 3);
    let (ledger, sink) = ledger_over(&family);

    let stranger = GuardianId::new();
    assert_eq!(
        ledger
            .submit_privacy(export_request(stranger, family.learners[0]))
            .unwrap_err(),
        LedgerError::Unauthorized
    );
    assert!(sink.entries().is_empty());
}

#[test]
fn learner_self_service() {
    let family = linked_family(1, 3);
    let (ledger, _) = ledger_over(&family);
    let learner = family.learners[0];

    let request = NewPrivacyRequest {
        requester: Requester::Learner(learner),
        learner,
        kind: PrivacyRequestKind::Export,
        contact_email: None,
        reason: None,
    };
    assert!(ledger.submit_privacy(request).is_ok());

    let other = NewPrivacyRequest {
        requester: Requester::Learner(learner),
        learner: LearnerId::new(),
        kind: PrivacyRequestKind::Export,
        contact_email: None,
        reason: None,
    };
    assert_eq!(
        ledger.submit_privacy(other).unwrap_err(),
        LedgerError::Unauthorized
    );
}

#[test]
fn privacy_lifecycle_records_reviewer_and_resolution() {
    let family = linked_family(1, 3);
    let (ledger, sink) = ledger_over(&family);
    let reviewer = ReviewerId::new();

    let id = ledger
        .submit_privacy(export_request(family.guardian, family.learners[0]))
        .unwrap()
        .id;
    ledger
        .transition_privacy(id, PrivacyStatus::InReview, reviewer, None)
        .unwrap();
    let done = ledger
        .transition_privacy(id, PrivacyStatus::Fulfilled, reviewer, Some("exported".into()))
        .unwrap();

    assert_eq!(done.handled_by, Some(reviewer));
    assert_eq!(done.admin_notes.as_deref(), Some("exported"));
    assert!(done.resolved_at.is_some());
    assert_eq!(sink.entries().len(), 3);
    assert!(ledger.audit().verify_integrity());
}

#[test]
fn review_cannot_be_skipped() {
    let family = linked_family(1, 3);
    let (ledger, _) = ledger_over(&family);

    let id = ledger
        .submit_privacy(export_request(family.guardian, family.learners[0]))
        .unwrap()
        .id;
    assert_eq!(
        ledger
            .transition_privacy(id, PrivacyStatus::Fulfilled, ReviewerId::new(), None)
            .unwrap_err(),
        LedgerError::InvalidTransition
    );
}

#[test]
fn raced_transitions_resolve_to_one_winner() {
    let family = linked_family(1, 3);
    let (ledger, _) = ledger_over(&family);
    let reviewer = ReviewerId::new();

    let id = ledger
        .submit_privacy(export_request(family.guardian, family.learners[0]))
        .unwrap()
        .id;
    ledger
        .transition_privacy(id, PrivacyStatus::InReview, reviewer, None)
        .unwrap();

    let results: Vec<_> = [PrivacyStatus::Fulfilled, PrivacyStatus::Rejected]
        .into_iter()
        .map(|next| {
            let ledger = std::sync::Arc::clone(&ledger);
            thread::spawn(move || {
                ledger.transition_privacy(id, next, ReviewerId::new(), None)
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(LedgerError::InvalidTransition)))
            .count(),
        1
    );
}

#[test]
fn safety_report_routes_to_trust() {
    let family = linked_family(0, 3);
    let (ledger, _) = ledger_over(&family);

    let report = ledger
        .submit_report(concern_report(family.guardian, ConcernCategory::Safety))
        .unwrap();
    assert_eq!(report.route, TriageRoute::Trust);
    assert!(report.case_id.as_str().starts_with("TS-"));
}

#[test]
fn empty_student_selection_is_invalid_scope() {
    let family = linked_family(2, 3);
    let (ledger, sink) = ledger_over(&family);

    let err = ledger
        .submit_deletion(NewDeletionRequest {
            requester: family.guardian,
            scope: DeletionScope::ParentAndStudents,
            include_learners: BTreeSet::new(),
            confirmed: true,
            reason: None,
            contact_email: None,
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidScope(_)));
    assert!(ledger.list_deletions(family.guardian).is_empty());
    assert!(sink.entries().is_empty());
}

#[test]
fn unconfirmed_deletion_is_rejected() {
    let family = linked_family(1, 3);
    let (ledger, _) = ledger_over(&family);

    let err = ledger
        .submit_deletion(NewDeletionRequest {
            requester: family.guardian,
            scope: DeletionScope::ParentOnly,
            include_learners: BTreeSet::new(),
            confirmed: false,
            reason: None,
            contact_email: None,
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidScope(_)));
}

#[test]
fn selection_must_be_subset_of_linked_learners() {
    let family = linked_family(1, 3);
    let (ledger, _) = ledger_over(&family);

    let mut include = BTreeSet::new();
    include.insert(family.learners[0]);
    include.insert(LearnerId::new());
    let err = ledger
        .submit_deletion(NewDeletionRequest {
            requester: family.guardian,
            scope: DeletionScope::ParentAndStudents,
            include_learners: include,
            confirmed: true,
            reason: None,
            contact_email: None,
        })
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidScope(_)));
}

#[test]
fn deletion_acceptance_is_terminal() {
    let family = linked_family(1, 3);
    let (ledger, _) = ledger_over(&family);
    let reviewer = ReviewerId::new();

    let id = ledger
        .submit_deletion(NewDeletionRequest {
            requester: family.guardian,
            scope: DeletionScope::ParentOnly,
            include_learners: BTreeSet::new(),
            confirmed: true,
            reason: None,
            contact_email: None,
        })
        .unwrap()
        .id;
    ledger
        .transition_deletion(id, DeletionStatus::Accepted, reviewer)
        .unwrap();
    assert_eq!(
        ledger
            .transition_deletion(id, DeletionStatus::Rejected, reviewer)
            .unwrap_err(),
        LedgerError::InvalidTransition
    );
}

#[test]
fn guardians_only_see_their_own_scope() {
    let family = linked_family(1, 3);
    let other = linked_family(1, 3);
    let (ledger, _) = ledger_over(&family);

    ledger
        .submit_privacy(export_request(family.guardian, family.learners[0]))
        .unwrap();

    assert_eq!(ledger.visible_privacy(family.guardian).len(), 1);
    assert!(ledger.visible_privacy(other.guardian).is_empty());
}
