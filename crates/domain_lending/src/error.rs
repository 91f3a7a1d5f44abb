//! Lending domain errors

use thiserror::Error;

/// Errors that can occur in the lending domain
#[derive(Debug, Error)]
pub enum LendingError {
    #[error("Schedule not found: {0}")]
    ScheduleNotFound(String),

    #[error("Schedule is completed; no further installments can be recorded")]
    ScheduleCompleted,

    #[error("Invalid loan terms: {0}")]
    InvalidTerms(String),

    #[error("Auto-debit cannot be changed on a completed schedule")]
    AutoDebitOnCompleted,
}
