//! Ticket DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_tickets::{SlaState, Ticket, TicketComment};

#[derive(Debug, Deserialize, Validate)]
pub struct OpenTicketRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, max = 256))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub description: String,
    /// "low", "medium", or "high"
    #[validate(length(min = 1))]
    pub priority: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    #[validate(length(min = 1))]
    pub body: String,
    #[serde(default)]
    pub is_internal: bool,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub agent_id: Uuid,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListTicketsQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub customer_id: Option<Uuid>,
    pub escalated: Option<bool>,
    /// Substring match against subject and description
    pub q: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: Uuid,
    pub ticket_number: String,
    pub customer_id: Uuid,
    pub subject: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub escalated: bool,
    pub sla_state: SlaState,
    pub first_response_due: DateTime<Utc>,
    pub resolution_due: DateTime<Utc>,
    pub first_response_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Ticket> for TicketResponse {
    fn from(ticket: &Ticket) -> Self {
        let sla_state = ticket.sla.state(
            Utc::now(),
            ticket.first_response_at,
            ticket.resolved_at,
        );

        Self {
            id: *ticket.id.as_uuid(),
            ticket_number: ticket.ticket_number.clone(),
            customer_id: *ticket.customer_id.as_uuid(),
            subject: ticket.subject.clone(),
            description: ticket.description.clone(),
            priority: ticket.priority.as_str().to_string(),
            status: ticket.status.as_str().to_string(),
            assigned_to: ticket.assigned_to.map(|a| *a.as_uuid()),
            escalated: ticket.escalated,
            sla_state,
            first_response_due: ticket.sla.first_response_due,
            resolution_due: ticket.sla.resolution_due,
            first_response_at: ticket.first_response_at,
            resolved_at: ticket.resolved_at,
            comments: ticket.comments.iter().map(CommentResponse::from).collect(),
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author: Option<Uuid>,
    pub body: String,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&TicketComment> for CommentResponse {
    fn from(comment: &TicketComment) -> Self {
        Self {
            id: *comment.id.as_uuid(),
            author: comment.author.map(|a| *a.as_uuid()),
            body: comment.body.clone(),
            is_internal: comment.is_internal,
            created_at: comment.created_at,
        }
    }
}
