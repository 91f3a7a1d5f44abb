//! KYC case aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{KycCaseId, CustomerId, AgentId};
use crate::decision::ReviewDecision;
use crate::screening::ScreeningOutcome;
use crate::error::KycError;

/// KYC case status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    /// Submitted, waiting for a reviewer
    Pending,
    /// A reviewer has picked the case up
    Review,
    /// Identity verified
    Approved,
    /// Verification refused
    Rejected,
}

impl KycStatus {
    /// Returns true if no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, KycStatus::Approved | KycStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Pending => "pending",
            KycStatus::Review => "review",
            KycStatus::Approved => "approved",
            KycStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for KycStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(KycStatus::Pending),
            "review" => Ok(KycStatus::Review),
            "approved" => Ok(KycStatus::Approved),
            "rejected" => Ok(KycStatus::Rejected),
            other => Err(format!("unknown kyc status: {}", other)),
        }
    }
}

/// Identity document kind accepted for verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Passport,
    NationalId,
    DriversLicense,
    VoterId,
    TaxId,
    UtilityBill,
    Other(String),
}

impl DocumentKind {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentKind::Passport => "passport",
            DocumentKind::NationalId => "national_id",
            DocumentKind::DriversLicense => "drivers_license",
            DocumentKind::VoterId => "voter_id",
            DocumentKind::TaxId => "tax_id",
            DocumentKind::UtilityBill => "utility_bill",
            DocumentKind::Other(s) => s.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "passport" => DocumentKind::Passport,
            "national_id" => DocumentKind::NationalId,
            "drivers_license" => DocumentKind::DriversLicense,
            "voter_id" => DocumentKind::VoterId,
            "tax_id" => DocumentKind::TaxId,
            "utility_bill" => DocumentKind::UtilityBill,
            other => DocumentKind::Other(other.to_string()),
        }
    }
}

/// Risk score assigned by automated screening
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskScore {
    Low,
    Medium,
    High,
}

impl RiskScore {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskScore::Low => "low",
            RiskScore::Medium => "medium",
            RiskScore::High => "high",
        }
    }
}

impl std::str::FromStr for RiskScore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(RiskScore::Low),
            "medium" => Ok(RiskScore::Medium),
            "high" => Ok(RiskScore::High),
            other => Err(format!("unknown risk score: {}", other)),
        }
    }
}

/// A customer identity-verification case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycCase {
    /// Unique identifier
    pub id: KycCaseId,
    /// Case number (human-readable)
    pub case_number: String,
    /// Customer under verification
    pub customer_id: CustomerId,
    /// Document kind presented
    pub document_kind: DocumentKind,
    /// Document number as printed
    pub document_number: String,
    /// Document expiry, when the kind carries one
    pub document_expiry: Option<NaiveDate>,
    /// Status
    pub status: KycStatus,
    /// Risk score from automated screening
    pub risk_score: RiskScore,
    /// Automated check result recorded at submission
    pub screening: Option<ScreeningOutcome>,
    /// Reason recorded when the case is rejected
    pub rejection_reason: Option<String>,
    /// Reviewer the case is assigned to
    pub assigned_to: Option<AgentId>,
    /// Reviewer who made the terminal decision
    pub decided_by: Option<AgentId>,
    /// When the decision was made
    pub decided_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl KycCase {
    /// Creates a new case in Pending with the supplied screening outcome
    pub fn submit(
        customer_id: CustomerId,
        document_kind: DocumentKind,
        document_number: String,
        document_expiry: Option<NaiveDate>,
        screening: ScreeningOutcome,
    ) -> Self {
        let now = Utc::now();
        let id = KycCaseId::new_v7();

        Self {
            id,
            case_number: generate_case_number(&id),
            customer_id,
            document_kind,
            document_number,
            document_expiry,
            status: KycStatus::Pending,
            risk_score: screening.risk_score,
            screening: Some(screening),
            rejection_reason: None,
            assigned_to: None,
            decided_by: None,
            decided_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the case into Review and assigns the reviewer
    pub fn start_review(&mut self, reviewer: AgentId) -> Result<(), KycError> {
        self.transition(KycStatus::Review)?;
        self.assigned_to = Some(reviewer);
        Ok(())
    }

    /// Applies a reviewer decision to a case in Review
    ///
    /// Rejections must carry a non-empty reason; this is the invariant the
    /// review screens rely on when surfacing refusals to the customer.
    pub fn decide(&mut self, decision: ReviewDecision) -> Result<(), KycError> {
        if self.status != KycStatus::Review {
            return Err(KycError::NotInReview(self.status.as_str().to_string()));
        }

        match decision {
            ReviewDecision::Approve { reviewer } => {
                self.transition(KycStatus::Approved)?;
                self.decided_by = Some(reviewer);
            }
            ReviewDecision::Reject { reviewer, reason } => {
                let reason = reason.trim().to_string();
                if reason.is_empty() {
                    return Err(KycError::RejectionReasonRequired);
                }
                self.transition(KycStatus::Rejected)?;
                self.decided_by = Some(reviewer);
                self.rejection_reason = Some(reason);
            }
        }
        self.decided_at = Some(self.updated_at);
        Ok(())
    }

    /// Validates and applies a status transition
    fn transition(&mut self, target: KycStatus) -> Result<(), KycError> {
        if !self.can_transition_to(target) {
            return Err(KycError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: KycStatus) -> bool {
        use KycStatus::*;
        matches!(
            (self.status, target),
            (Pending, Review) | (Review, Approved) | (Review, Rejected)
        )
    }
}

fn generate_case_number(id: &KycCaseId) -> String {
    let (hi, ..) = id.as_uuid().as_fields();
    format!("KYC-{}-{:07}", Utc::now().format("%Y"), hi % 10_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::ScreeningOutcome;

    fn pending_case() -> KycCase {
        KycCase::submit(
            CustomerId::new_v7(),
            DocumentKind::Passport,
            "P1234567".to_string(),
            None,
            ScreeningOutcome::clean(),
        )
    }

    #[test]
    fn test_submit_starts_pending() {
        let case = pending_case();
        assert_eq!(case.status, KycStatus::Pending);
        assert!(case.case_number.starts_with("KYC-"));
        assert!(case.rejection_reason.is_none());
    }

    #[test]
    fn test_pending_to_review() {
        let mut case = pending_case();
        let reviewer = AgentId::new_v7();
        assert!(case.start_review(reviewer).is_ok());
        assert_eq!(case.status, KycStatus::Review);
        assert_eq!(case.assigned_to, Some(reviewer));
    }

    #[test]
    fn test_decide_requires_review() {
        let mut case = pending_case();
        let result = case.decide(ReviewDecision::Approve {
            reviewer: AgentId::new_v7(),
        });
        assert!(matches!(result, Err(KycError::NotInReview(_))));
    }

    #[test]
    fn test_rejection_requires_reason() {
        let mut case = pending_case();
        case.start_review(AgentId::new_v7()).unwrap();

        let result = case.decide(ReviewDecision::Reject {
            reviewer: AgentId::new_v7(),
            reason: "   ".to_string(),
        });
        assert!(matches!(result, Err(KycError::RejectionReasonRequired)));
        assert_eq!(case.status, KycStatus::Review);
    }

    #[test]
    fn test_approve_is_terminal() {
        let mut case = pending_case();
        let reviewer = AgentId::new_v7();
        case.start_review(reviewer).unwrap();
        case.decide(ReviewDecision::Approve { reviewer }).unwrap();

        assert_eq!(case.status, KycStatus::Approved);
        assert!(case.status.is_terminal());
        assert_eq!(case.decided_by, Some(reviewer));
        assert!(case.decided_at.is_some());

        // No way back
        assert!(case.start_review(reviewer).is_err());
    }

    #[test]
    fn test_reject_records_reason() {
        let mut case = pending_case();
        let reviewer = AgentId::new_v7();
        case.start_review(reviewer).unwrap();
        case.decide(ReviewDecision::Reject {
            reviewer,
            reason: "Document number does not match issuer records".to_string(),
        })
        .unwrap();

        assert_eq!(case.status, KycStatus::Rejected);
        assert_eq!(
            case.rejection_reason.as_deref(),
            Some("Document number does not match issuer records")
        );
    }

    #[test]
    fn test_no_double_decision() {
        let mut case = pending_case();
        let reviewer = AgentId::new_v7();
        case.start_review(reviewer).unwrap();
        case.decide(ReviewDecision::Approve { reviewer }).unwrap();

        let again = case.decide(ReviewDecision::Reject {
            reviewer,
            reason: "changed my mind".to_string(),
        });
        assert!(again.is_err());
        assert_eq!(case.status, KycStatus::Approved);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [KycStatus::Pending, KycStatus::Review, KycStatus::Approved, KycStatus::Rejected] {
            let parsed: KycStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }
}
