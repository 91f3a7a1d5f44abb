//! Workflow domain errors

use thiserror::Error;

/// Errors that can occur in the workflow domain
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Work item not found: {0}")]
    ItemNotFound(String),

    #[error("Work item already claimed by {0}")]
    AlreadyClaimed(String),

    #[error("Work item is not claimed")]
    NotClaimed,

    #[error("Work item claimed by a different agent")]
    ClaimedByOther,
}
