//! Ticket handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{AgentId, CustomerId, TicketId};
use domain_tickets::{Ticket, TicketEvent, TicketQuery, TicketStatus};
use domain_workflow::{WorkItem, WorkItemKind};

use crate::auth::Claims;
use crate::dto::tickets::*;
use crate::error::ApiError;
use crate::handlers::ticket_priority;
use crate::AppState;

/// Opens a new ticket and places it on the agent queue
pub async fn open_ticket(
    State(state): State<AppState>,
    Json(request): Json<OpenTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    request.validate()?;

    let priority = request
        .priority
        .parse()
        .map_err(ApiError::BadRequest)?;

    let ticket = Ticket::open(
        CustomerId::from(request.customer_id),
        request.subject,
        request.description,
        priority,
    );

    state.tickets.insert_ticket(&ticket, None).await?;

    let item = WorkItem::new(
        WorkItemKind::Ticket,
        *ticket.id.as_uuid(),
        ticket_priority(ticket.priority),
    );
    state.queue.enqueue(&item, None).await?;

    state.hub.publish(TicketEvent::TicketOpened {
        ticket_id: ticket.id,
        customer_id: ticket.customer_id,
        priority: ticket.priority,
        timestamp: Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(TicketResponse::from(&ticket))))
}

/// Lists tickets with optional filters
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(params): Query<ListTicketsQuery>,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    let query = TicketQuery {
        status: params
            .status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        priority: params
            .priority
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        customer_id: params.customer_id.map(CustomerId::from),
        assigned_to: None,
        escalated: params.escalated,
        text: params.q,
        limit: params.limit,
        offset: params.offset,
    };

    let tickets = state.tickets.find_tickets(query, None).await?;
    Ok(Json(tickets.iter().map(TicketResponse::from).collect()))
}

/// Gets a ticket by ID, including its comment thread
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = state.tickets.get_ticket(TicketId::from(id), None).await?;
    Ok(Json(TicketResponse::from(&ticket)))
}

/// Applies a status transition
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    request.validate()?;
    let target: TicketStatus = request.status.parse().map_err(ApiError::BadRequest)?;

    let mut ticket = state.tickets.get_ticket(TicketId::from(id), None).await?;
    let from = ticket.status;
    ticket.update_status(target)?;
    state.tickets.update_ticket(&ticket, None).await?;

    state.hub.publish(TicketEvent::StatusChanged {
        ticket_id: ticket.id,
        from,
        to: ticket.status,
        timestamp: Utc::now(),
    });

    if ticket.status == TicketStatus::Resolved {
        state
            .queue
            .complete_for_case(*ticket.id.as_uuid(), None)
            .await?;
        state.hub.publish(TicketEvent::TicketResolved {
            ticket_id: ticket.id,
            customer_id: ticket.customer_id,
            timestamp: Utc::now(),
        });
    }

    Ok(Json(TicketResponse::from(&ticket)))
}

/// Adds an agent comment to the thread
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    request.validate()?;
    let author = claims
        .agent_id()
        .map_err(|_| ApiError::BadRequest("token subject is not an agent id".to_string()))?;

    let mut ticket = state.tickets.get_ticket(TicketId::from(id), None).await?;
    let comment = ticket
        .add_comment(Some(author), request.body, request.is_internal)?
        .clone();
    state.tickets.update_ticket(&ticket, None).await?;

    state.hub.publish(TicketEvent::CommentAdded {
        ticket_id: ticket.id,
        author: Some(author),
        is_internal: comment.is_internal,
        timestamp: Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(CommentResponse::from(&comment))))
}

/// Assigns the ticket to an agent
pub async fn assign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    let agent = AgentId::from(request.agent_id);

    let mut ticket = state.tickets.get_ticket(TicketId::from(id), None).await?;
    ticket.assign(agent)?;
    state.tickets.update_ticket(&ticket, None).await?;

    state.hub.publish(TicketEvent::TicketAssigned {
        ticket_id: ticket.id,
        agent,
        timestamp: Utc::now(),
    });

    Ok(Json(TicketResponse::from(&ticket)))
}

/// Escalates the ticket to High priority
///
/// The queue entry is re-ranked so the escalation is visible to whoever
/// picks up work next.
pub async fn escalate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, ApiError> {
    let mut ticket = state.tickets.get_ticket(TicketId::from(id), None).await?;
    ticket.escalate()?;
    state.tickets.update_ticket(&ticket, None).await?;

    state
        .queue
        .complete_for_case(*ticket.id.as_uuid(), None)
        .await?;
    let item = WorkItem::new(
        WorkItemKind::Ticket,
        *ticket.id.as_uuid(),
        ticket_priority(ticket.priority),
    );
    state.queue.enqueue(&item, None).await?;

    state.hub.publish(TicketEvent::TicketEscalated {
        ticket_id: ticket.id,
        timestamp: Utc::now(),
    });

    Ok(Json(TicketResponse::from(&ticket)))
}
