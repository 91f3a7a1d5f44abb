//! Domain assertions shared across test suites

use domain_kyc::{KycCase, KycStatus};
use domain_workflow::WorkItem;

/// Panics unless the case is in a terminal status with consistent fields
pub fn assert_terminal(case: &KycCase) {
    assert!(
        case.status.is_terminal(),
        "expected terminal status, got {}",
        case.status.as_str()
    );
    assert!(case.decided_by.is_some(), "terminal case missing decider");
    assert!(case.decided_at.is_some(), "terminal case missing decision time");
    if case.status == KycStatus::Rejected {
        assert!(
            case.rejection_reason
                .as_deref()
                .map(|r| !r.trim().is_empty())
                .unwrap_or(false),
            "rejected case missing reason"
        );
    }
}

/// Panics unless the items are in pickup order
///
/// Unclaimed before claimed, then priority descending, then oldest first.
pub fn assert_pickup_order(items: &[WorkItem]) {
    for pair in items.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let ordered = (a.is_claimed(), std::cmp::Reverse(a.priority), a.enqueued_at)
            <= (b.is_claimed(), std::cmp::Reverse(b.priority), b.enqueued_at);
        assert!(
            ordered,
            "queue out of order: {:?} before {:?}",
            (a.priority, a.enqueued_at),
            (b.priority, b.enqueued_at)
        );
    }
}
