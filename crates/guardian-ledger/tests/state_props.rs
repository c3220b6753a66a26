use guardian_ledger::{
    validate_transition, ConcernCategory, DeletionStatus, PrivacyStatus, ReportStatus,
    RequestState, TriageRoute,
};
use proptest::prelude::*;

fn any_privacy_status() -> impl Strategy<Value = PrivacyStatus> {
    prop_oneof![
        Just(PrivacyStatus::Pending),
        Just(PrivacyStatus::InReview),
        Just(PrivacyStatus::Fulfilled),
        Just(PrivacyStatus::Rejected),
    ]
}

fn any_report_status() -> impl Strategy<Value = ReportStatus> {
    prop_oneof![
        Just(ReportStatus::Open),
        Just(ReportStatus::InReview),
        Just(ReportStatus::Resolved),
        Just(ReportStatus::Closed),
    ]
}

fn any_category() -> impl Strategy<Value = ConcernCategory> {
    prop_oneof![
        Just(ConcernCategory::Safety),
        Just(ConcernCategory::Content),
        Just(ConcernCategory::Data),
        Just(ConcernCategory::Account),
        Just(ConcernCategory::Billing),
        Just(ConcernCategory::Other),
    ]
}

proptest! {
    #[test]
    fn prop_validation_matches_transition_table(
        from in any_privacy_status(),
        to in any_privacy_status(),
    ) {
        let res = validate_transition(from, to);
        prop_assert_eq!(res.is_ok(), from.allowed_transitions().contains(&to));
    }

    #[test]
    fn prop_terminal_privacy_states_are_terminal(
        to in any_privacy_status(),
    ) {
        prop_assert!(validate_transition(PrivacyStatus::Fulfilled, to).is_err());
        prop_assert!(validate_transition(PrivacyStatus::Rejected, to).is_err());
    }

    #[test]
    fn prop_terminal_report_states_are_terminal(
        to in any_report_status(),
    ) {
        prop_assert!(validate_transition(ReportStatus::Resolved, to).is_err());
        prop_assert!(validate_transition(ReportStatus::Closed, to).is_err());
    }

    #[test]
    fn prop_no_sequence_escapes_a_terminal_state(
        steps in proptest::collection::vec(any_privacy_status(), 1..16),
    ) {
        let mut state = PrivacyStatus::Pending;
        for next in steps {
            if validate_transition(state, next).is_ok() {
                state = next;
            }
            if state.is_terminal() {
                // Once terminal, nothing may move the state again.
                prop_assert!(validate_transition(state, PrivacyStatus::Pending).is_err());
                prop_assert!(validate_transition(state, PrivacyStatus::InReview).is_err());
            }
        }
    }

    #[test]
    fn prop_routing_is_deterministic(category in any_category()) {
        let first = guardian_ledger::route(category);
        for _ in 0..32 {
            prop_assert_eq!(guardian_ledger::route(category), first);
        }
    }

    #[test]
    fn prop_routing_matches_the_fixed_table(category in any_category()) {
        let expected = match category {
            ConcernCategory::Safety | ConcernCategory::Content => TriageRoute::Trust,
            ConcernCategory::Data => TriageRoute::Privacy,
            ConcernCategory::Account | ConcernCategory::Billing | ConcernCategory::Other => {
                TriageRoute::Support
            }
        };
        prop_assert_eq!(guardian_ledger::route(category), expected);
    }
}

#[test]
fn deletion_terminals() {
    assert!(DeletionStatus::Accepted.is_terminal());
    assert!(DeletionStatus::Rejected.is_terminal());
    assert!(!DeletionStatus::Pending.is_terminal());
}
