//! KYC domain errors

use thiserror::Error;

/// Errors that can occur in the KYC domain
#[derive(Debug, Error)]
pub enum KycError {
    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Rejection requires a reason")]
    RejectionReasonRequired,

    #[error("Case is terminal and cannot be modified")]
    CaseTerminal,

    #[error("Case must be in review before a decision: {0}")]
    NotInReview(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}
