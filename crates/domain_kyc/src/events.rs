//! Domain events for the KYC case aggregate
//!
//! Domain events represent significant occurrences within the case lifecycle.
//! They are used for:
//! - Audit trails
//! - Event-driven integrations
//! - Triggering downstream processes (customer notifications, account opening)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, CustomerId, KycCaseId};

use crate::case::RiskScore;

/// Domain events emitted by the KYC case aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KycEvent {
    /// A new case entered the pending pool
    CaseSubmitted {
        case_id: KycCaseId,
        customer_id: CustomerId,
        risk_score: RiskScore,
        timestamp: DateTime<Utc>,
    },

    /// Automated screening finished for a submission
    ScreeningCompleted {
        case_id: KycCaseId,
        risk_score: RiskScore,
        all_passed: bool,
        timestamp: DateTime<Utc>,
    },

    /// A reviewer picked the case up
    ReviewStarted {
        case_id: KycCaseId,
        reviewer: AgentId,
        timestamp: DateTime<Utc>,
    },

    /// Identity verified
    CaseApproved {
        case_id: KycCaseId,
        customer_id: CustomerId,
        reviewer: AgentId,
        timestamp: DateTime<Utc>,
    },

    /// Verification refused
    CaseRejected {
        case_id: KycCaseId,
        customer_id: CustomerId,
        reviewer: AgentId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl KycEvent {
    /// Returns the case the event belongs to
    pub fn case_id(&self) -> KycCaseId {
        match self {
            KycEvent::CaseSubmitted { case_id, .. }
            | KycEvent::ScreeningCompleted { case_id, .. }
            | KycEvent::ReviewStarted { case_id, .. }
            | KycEvent::CaseApproved { case_id, .. }
            | KycEvent::CaseRejected { case_id, .. } => *case_id,
        }
    }
}
