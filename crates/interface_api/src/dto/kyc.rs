//! KYC DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_kyc::{KycCase, ports::KycStatusChange};

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitCaseRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1))]
    pub document_kind: String,
    #[validate(length(min = 1, max = 64))]
    pub document_number: String,
    pub document_expiry: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    /// "approve" or "reject"
    #[validate(length(min = 1))]
    pub decision: String,
    /// Required when rejecting
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListCasesQuery {
    pub status: Option<String>,
    pub risk_score: Option<String>,
    pub customer_id: Option<Uuid>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct KycCaseResponse {
    pub id: Uuid,
    pub case_number: String,
    pub customer_id: Uuid,
    pub document_kind: String,
    pub document_number: String,
    pub document_expiry: Option<NaiveDate>,
    pub status: String,
    pub risk_score: String,
    pub screening_passed: Option<bool>,
    pub rejection_reason: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&KycCase> for KycCaseResponse {
    fn from(case: &KycCase) -> Self {
        Self {
            id: (*case.id.as_uuid()),
            case_number: case.case_number.clone(),
            customer_id: *case.customer_id.as_uuid(),
            document_kind: case.document_kind.as_str().to_string(),
            document_number: case.document_number.clone(),
            document_expiry: case.document_expiry,
            status: case.status.as_str().to_string(),
            risk_score: case.risk_score.as_str().to_string(),
            screening_passed: case.screening.as_ref().map(|s| s.all_passed()),
            rejection_reason: case.rejection_reason.clone(),
            assigned_to: case.assigned_to.map(|a| *a.as_uuid()),
            created_at: case.created_at,
            updated_at: case.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub status: String,
    pub changed_by: Option<Uuid>,
    pub reason: Option<String>,
    pub changed_at: DateTime<Utc>,
}

impl From<&KycStatusChange> for StatusChangeResponse {
    fn from(change: &KycStatusChange) -> Self {
        Self {
            status: change.status.as_str().to_string(),
            changed_by: change.changed_by.map(|a| *a.as_uuid()),
            reason: change.reason.clone(),
            changed_at: change.changed_at,
        }
    }
}
