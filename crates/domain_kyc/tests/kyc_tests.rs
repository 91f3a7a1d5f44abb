//! Comprehensive tests for domain_kyc

use chrono::{Days, NaiveDate};

use core_kernel::{AgentId, CustomerId};
use domain_kyc::{
    screen, DocumentKind, KycCase, KycStatus, ReviewDecision, RiskScore, ScreeningOutcome,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
}

fn submit(kind: DocumentKind, number: &str, expiry: Option<NaiveDate>) -> KycCase {
    let screening = screen(&kind, number, expiry, today());
    KycCase::submit(
        CustomerId::new_v7(),
        kind,
        number.to_string(),
        expiry,
        screening,
    )
}

// ============================================================================
// Submission and screening
// ============================================================================

mod submission {
    use super::*;

    #[test]
    fn test_clean_submission_is_low_risk_pending() {
        let case = submit(DocumentKind::Passport, "P1234567", None);

        assert_eq!(case.status, KycStatus::Pending);
        assert_eq!(case.risk_score, RiskScore::Low);
        assert!(case.screening.as_ref().unwrap().all_passed());
        assert!(case.assigned_to.is_none());
        assert!(case.decided_by.is_none());
    }

    #[test]
    fn test_malformed_document_is_high_risk_but_accepted() {
        // Intake never refuses a submission; risk surfaces to the reviewer
        let case = submit(DocumentKind::Passport, "BOGUS", None);

        assert_eq!(case.status, KycStatus::Pending);
        assert_eq!(case.risk_score, RiskScore::High);
        assert!(!case.screening.as_ref().unwrap().all_passed());
    }

    #[test]
    fn test_expired_document_flags_high() {
        let expired = today().checked_sub_days(Days::new(30)).unwrap();
        let case = submit(DocumentKind::Passport, "P1234567", Some(expired));

        assert_eq!(case.risk_score, RiskScore::High);
        let failures = case.screening.as_ref().unwrap().failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("expired"));
    }

    #[test]
    fn test_address_proof_is_medium_risk() {
        let case = submit(DocumentKind::UtilityBill, "ACC-9213", None);
        assert_eq!(case.risk_score, RiskScore::Medium);
    }
}

// ============================================================================
// Transition graph
// ============================================================================

mod transitions {
    use super::*;

    #[test]
    fn test_full_approval_path() {
        let mut case = submit(DocumentKind::NationalId, "123456789012", None);
        let reviewer = AgentId::new_v7();

        case.start_review(reviewer).unwrap();
        assert_eq!(case.status, KycStatus::Review);
        assert_eq!(case.assigned_to, Some(reviewer));

        case.decide(ReviewDecision::approve(reviewer)).unwrap();
        assert_eq!(case.status, KycStatus::Approved);
        assert_eq!(case.decided_by, Some(reviewer));
        assert!(case.decided_at.is_some());
        assert!(case.rejection_reason.is_none());
    }

    #[test]
    fn test_full_rejection_path() {
        let mut case = submit(DocumentKind::TaxId, "ABCDE1234F", None);
        let reviewer = AgentId::new_v7();

        case.start_review(reviewer).unwrap();
        case.decide(ReviewDecision::reject(reviewer, "Photo does not match"))
            .unwrap();

        assert_eq!(case.status, KycStatus::Rejected);
        assert_eq!(case.rejection_reason.as_deref(), Some("Photo does not match"));
    }

    #[test]
    fn test_pending_cannot_be_decided_directly() {
        let mut case = submit(DocumentKind::Passport, "P1234567", None);
        let result = case.decide(ReviewDecision::approve(AgentId::new_v7()));
        assert!(result.is_err());
        assert_eq!(case.status, KycStatus::Pending);
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        let mut case = submit(DocumentKind::Passport, "P1234567", None);
        let reviewer = AgentId::new_v7();
        case.start_review(reviewer).unwrap();
        case.decide(ReviewDecision::approve(reviewer)).unwrap();

        assert!(case.start_review(reviewer).is_err());
        assert!(case.decide(ReviewDecision::approve(reviewer)).is_err());
        assert!(case
            .decide(ReviewDecision::reject(reviewer, "too late"))
            .is_err());
    }

    #[test]
    fn test_double_review_is_rejected() {
        let mut case = submit(DocumentKind::Passport, "P1234567", None);
        case.start_review(AgentId::new_v7()).unwrap();
        assert!(case.start_review(AgentId::new_v7()).is_err());
    }
}

// ============================================================================
// Rejection-reason invariant
// ============================================================================

mod rejection_reason {
    use super::*;

    #[test]
    fn test_empty_reason_is_refused() {
        let mut case = submit(DocumentKind::Passport, "P1234567", None);
        let reviewer = AgentId::new_v7();
        case.start_review(reviewer).unwrap();

        for bad in ["", "   ", "\t\n"] {
            let result = case.decide(ReviewDecision::reject(reviewer, bad));
            assert!(result.is_err(), "reason {:?} should be refused", bad);
            assert_eq!(case.status, KycStatus::Review);
        }
    }

    #[test]
    fn test_reason_is_trimmed() {
        let mut case = submit(DocumentKind::Passport, "P1234567", None);
        let reviewer = AgentId::new_v7();
        case.start_review(reviewer).unwrap();
        case.decide(ReviewDecision::reject(reviewer, "  smudged stamp  "))
            .unwrap();

        assert_eq!(case.rejection_reason.as_deref(), Some("smudged stamp"));
    }
}

// ============================================================================
// Serialization
// ============================================================================

mod serialization {
    use super::*;

    #[test]
    fn test_case_round_trips_through_json() {
        let case = submit(DocumentKind::Passport, "P1234567", None);
        let json = serde_json::to_string(&case).unwrap();
        let back: KycCase = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, case.id);
        assert_eq!(back.status, case.status);
        assert_eq!(back.screening, case.screening);
    }

    #[test]
    fn test_screening_outcome_round_trips() {
        let outcome = ScreeningOutcome::clean();
        let json = serde_json::to_string(&outcome).unwrap();
        let back: ScreeningOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
