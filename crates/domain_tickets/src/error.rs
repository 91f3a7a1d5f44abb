//! Ticket domain errors

use thiserror::Error;

/// Errors that can occur in the support domain
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Ticket is resolved and cannot be modified")]
    TicketResolved,

    #[error("Comment body must not be empty")]
    EmptyComment,

    #[error("Ticket is already escalated")]
    AlreadyEscalated,
}
