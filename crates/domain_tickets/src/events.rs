//! Domain events for the ticket aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, CustomerId, TicketId};

use crate::ticket::{TicketPriority, TicketStatus};

/// Domain events emitted by the Ticket aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TicketEvent {
    /// A customer raised a new ticket
    TicketOpened {
        ticket_id: TicketId,
        customer_id: CustomerId,
        priority: TicketPriority,
        timestamp: DateTime<Utc>,
    },

    /// The ticket moved to a new status
    StatusChanged {
        ticket_id: TicketId,
        from: TicketStatus,
        to: TicketStatus,
        timestamp: DateTime<Utc>,
    },

    /// The ticket was assigned to an agent
    TicketAssigned {
        ticket_id: TicketId,
        agent: AgentId,
        timestamp: DateTime<Utc>,
    },

    /// A comment was added
    CommentAdded {
        ticket_id: TicketId,
        author: Option<AgentId>,
        is_internal: bool,
        timestamp: DateTime<Utc>,
    },

    /// The ticket was escalated to High priority
    TicketEscalated {
        ticket_id: TicketId,
        timestamp: DateTime<Utc>,
    },

    /// The ticket was resolved
    TicketResolved {
        ticket_id: TicketId,
        customer_id: CustomerId,
        timestamp: DateTime<Utc>,
    },
}

impl TicketEvent {
    /// Returns the ticket the event belongs to
    pub fn ticket_id(&self) -> TicketId {
        match self {
            TicketEvent::TicketOpened { ticket_id, .. }
            | TicketEvent::StatusChanged { ticket_id, .. }
            | TicketEvent::TicketAssigned { ticket_id, .. }
            | TicketEvent::CommentAdded { ticket_id, .. }
            | TicketEvent::TicketEscalated { ticket_id, .. }
            | TicketEvent::TicketResolved { ticket_id, .. } => *ticket_id,
        }
    }
}
