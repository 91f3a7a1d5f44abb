//! Support ticket aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AgentId, CommentId, CustomerId, TicketId};

use crate::error::TicketError;
use crate::sla::{SlaDeadlines, SlaPolicy};

/// Ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Raised by the customer, not yet worked
    Open,
    /// An agent is actively working it
    InProgress,
    /// Waiting on the customer
    Pending,
    /// Closed with an answer
    Resolved,
}

impl TicketStatus {
    /// Returns true if no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Resolved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Pending => "pending",
            TicketStatus::Resolved => "resolved",
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "in_progress" => Ok(TicketStatus::InProgress),
            "pending" => Ok(TicketStatus::Pending),
            "resolved" => Ok(TicketStatus::Resolved),
            other => Err(format!("unknown ticket status: {}", other)),
        }
    }
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

impl TicketPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
        }
    }
}

impl std::str::FromStr for TicketPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TicketPriority::Low),
            "medium" => Ok(TicketPriority::Medium),
            "high" => Ok(TicketPriority::High),
            other => Err(format!("unknown ticket priority: {}", other)),
        }
    }
}

/// A comment on a ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketComment {
    pub id: CommentId,
    pub ticket_id: TicketId,
    /// Agent author; None when the customer wrote it
    pub author: Option<AgentId>,
    pub body: String,
    /// Internal notes are not shown to the customer
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

/// A customer support ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier
    pub id: TicketId,
    /// Ticket number (human-readable)
    pub ticket_number: String,
    /// Customer who raised it
    pub customer_id: CustomerId,
    /// Short subject line
    pub subject: String,
    /// Free-text description
    pub description: String,
    /// Priority
    pub priority: TicketPriority,
    /// Status
    pub status: TicketStatus,
    /// Assigned agent
    pub assigned_to: Option<AgentId>,
    /// Set when the ticket has been escalated
    pub escalated: bool,
    /// SLA deadlines for the current priority
    pub sla: SlaDeadlines,
    /// Comments, oldest first
    pub comments: Vec<TicketComment>,
    /// When an agent first responded
    pub first_response_at: Option<DateTime<Utc>>,
    /// When the ticket was resolved
    pub resolved_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Opens a new ticket
    pub fn open(
        customer_id: CustomerId,
        subject: impl Into<String>,
        description: impl Into<String>,
        priority: TicketPriority,
    ) -> Self {
        let now = Utc::now();
        let id = TicketId::new_v7();

        Self {
            id,
            ticket_number: generate_ticket_number(&id),
            customer_id,
            subject: subject.into(),
            description: description.into(),
            priority,
            status: TicketStatus::Open,
            assigned_to: None,
            escalated: false,
            sla: SlaPolicy::standard(priority).deadlines(now),
            comments: Vec::new(),
            first_response_at: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assigns the ticket to an agent
    pub fn assign(&mut self, agent: AgentId) -> Result<(), TicketError> {
        if self.status.is_terminal() {
            return Err(TicketError::TicketResolved);
        }
        self.assigned_to = Some(agent);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Updates the status
    pub fn update_status(&mut self, status: TicketStatus) -> Result<(), TicketError> {
        if !self.can_transition_to(status) {
            return Err(TicketError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        if status == TicketStatus::Resolved {
            self.resolved_at = Some(self.updated_at);
        }
        Ok(())
    }

    /// Adds a comment
    ///
    /// The first agent comment stamps the first-response time used for SLA
    /// evaluation.
    pub fn add_comment(
        &mut self,
        author: Option<AgentId>,
        body: impl Into<String>,
        is_internal: bool,
    ) -> Result<&TicketComment, TicketError> {
        if self.status.is_terminal() {
            return Err(TicketError::TicketResolved);
        }
        let body = body.into();
        if body.trim().is_empty() {
            return Err(TicketError::EmptyComment);
        }

        let now = Utc::now();
        if author.is_some() && !is_internal && self.first_response_at.is_none() {
            self.first_response_at = Some(now);
        }

        self.comments.push(TicketComment {
            id: CommentId::new_v7(),
            ticket_id: self.id,
            author,
            body,
            is_internal,
            created_at: now,
        });
        self.updated_at = now;
        Ok(self.comments.last().expect("comment just pushed"))
    }

    /// Escalates the ticket, raising priority to High and re-deriving SLA
    ///
    /// Deadlines stay anchored to the original open time so escalation can
    /// surface an already-breached SLA rather than reset the clock.
    pub fn escalate(&mut self) -> Result<(), TicketError> {
        if self.status.is_terminal() {
            return Err(TicketError::TicketResolved);
        }
        if self.escalated {
            return Err(TicketError::AlreadyEscalated);
        }
        self.escalated = true;
        self.priority = TicketPriority::High;
        self.sla = SlaPolicy::standard(self.priority).deadlines(self.created_at);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self.status, target),
            (Open, InProgress) |
            (Open, Resolved) |
            (InProgress, Pending) |
            (InProgress, Resolved) |
            (Pending, InProgress)
        )
    }
}

fn generate_ticket_number(id: &TicketId) -> String {
    let (hi, ..) = id.as_uuid().as_fields();
    format!("TKT-{}-{:07}", Utc::now().format("%Y"), hi % 10_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_ticket() -> Ticket {
        Ticket::open(
            CustomerId::new_v7(),
            "Card blocked after three PIN retries",
            "Customer cannot use their debit card at ATMs.",
            TicketPriority::Medium,
        )
    }

    #[test]
    fn test_open_ticket() {
        let ticket = open_ticket();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.ticket_number.starts_with("TKT-"));
        assert!(!ticket.escalated);
        assert!(ticket.comments.is_empty());
    }

    #[test]
    fn test_open_to_in_progress() {
        let mut ticket = open_ticket();
        assert!(ticket.update_status(TicketStatus::InProgress).is_ok());
    }

    #[test]
    fn test_open_to_pending_is_invalid() {
        let mut ticket = open_ticket();
        assert!(ticket.update_status(TicketStatus::Pending).is_err());
    }

    #[test]
    fn test_pending_round_trip() {
        let mut ticket = open_ticket();
        ticket.update_status(TicketStatus::InProgress).unwrap();
        ticket.update_status(TicketStatus::Pending).unwrap();
        assert!(ticket.update_status(TicketStatus::InProgress).is_ok());
    }

    #[test]
    fn test_pending_cannot_resolve_directly() {
        let mut ticket = open_ticket();
        ticket.update_status(TicketStatus::InProgress).unwrap();
        ticket.update_status(TicketStatus::Pending).unwrap();
        assert!(ticket.update_status(TicketStatus::Resolved).is_err());
    }

    #[test]
    fn test_resolved_is_terminal() {
        let mut ticket = open_ticket();
        ticket.update_status(TicketStatus::InProgress).unwrap();
        ticket.update_status(TicketStatus::Resolved).unwrap();

        assert!(ticket.resolved_at.is_some());
        assert!(ticket.update_status(TicketStatus::InProgress).is_err());
        assert!(ticket.assign(AgentId::new_v7()).is_err());
        assert!(ticket.escalate().is_err());
        assert!(ticket.add_comment(None, "hello?", false).is_err());
    }

    #[test]
    fn test_first_agent_comment_stamps_response() {
        let mut ticket = open_ticket();
        let agent = AgentId::new_v7();

        // Customer comment does not count
        ticket.add_comment(None, "Any update?", false).unwrap();
        assert!(ticket.first_response_at.is_none());

        // Internal note does not count either
        ticket.add_comment(Some(agent), "Checking with card ops", true).unwrap();
        assert!(ticket.first_response_at.is_none());

        ticket
            .add_comment(Some(agent), "We have unblocked your card.", false)
            .unwrap();
        assert!(ticket.first_response_at.is_some());
        assert_eq!(ticket.comments.len(), 3);
    }

    #[test]
    fn test_empty_comment_rejected() {
        let mut ticket = open_ticket();
        assert!(matches!(
            ticket.add_comment(None, "   ", false),
            Err(TicketError::EmptyComment)
        ));
    }

    #[test]
    fn test_escalate_raises_priority_and_keeps_anchor() {
        let mut ticket = open_ticket();
        let original_resolution_due = ticket.sla.resolution_due;

        ticket.escalate().unwrap();

        assert!(ticket.escalated);
        assert_eq!(ticket.priority, TicketPriority::High);
        // High resolution window is shorter, so the due time moved earlier
        assert!(ticket.sla.resolution_due < original_resolution_due);
    }

    #[test]
    fn test_double_escalation_rejected() {
        let mut ticket = open_ticket();
        ticket.escalate().unwrap();
        assert!(matches!(ticket.escalate(), Err(TicketError::AlreadyEscalated)));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Pending,
            TicketStatus::Resolved,
        ] {
            let parsed: TicketStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }
}
