//! Request handlers for each domain

pub mod health;
pub mod kyc;
pub mod tickets;
pub mod loans;
pub mod queue;

use domain_kyc::RiskScore;
use domain_tickets::TicketPriority;
use domain_workflow::WorkPriority;

/// Maps a KYC risk score onto the shared queue priority scale
pub(crate) fn risk_priority(risk: RiskScore) -> WorkPriority {
    match risk {
        RiskScore::Low => WorkPriority::Low,
        RiskScore::Medium => WorkPriority::Medium,
        RiskScore::High => WorkPriority::High,
    }
}

/// Maps a ticket priority onto the shared queue priority scale
pub(crate) fn ticket_priority(priority: TicketPriority) -> WorkPriority {
    match priority {
        TicketPriority::Low => WorkPriority::Low,
        TicketPriority::Medium => WorkPriority::Medium,
        TicketPriority::High => WorkPriority::High,
    }
}
