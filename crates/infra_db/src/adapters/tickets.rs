//! PostgreSQL Ticket Adapter
//!
//! Implements `TicketPort` over the tickets and ticket_comments tables.
//! Comments are append-only; updates upsert them with ON CONFLICT DO NOTHING
//! so replaying a ticket save never duplicates a comment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{
    AgentId, CommentId, CustomerId, TicketId, PortError, DomainPort,
    OperationMetadata, HealthCheckable, HealthCheckResult,
};
use domain_tickets::{
    sla::SlaDeadlines, Ticket, TicketComment, TicketPort, TicketQuery,
};

use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of the TicketPort trait
#[derive(Debug, Clone)]
pub struct PostgresTicketAdapter {
    pool: PgPool,
}

impl PostgresTicketAdapter {
    /// Creates a new PostgreSQL ticket adapter
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_comments(&self, ticket_id: TicketId) -> Result<Vec<TicketComment>, PortError> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            "SELECT comment_id, ticket_id, author, body, is_internal, created_at \
             FROM ticket_comments WHERE ticket_id = $1 ORDER BY created_at ASC",
        )
        .bind(Uuid::from(ticket_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        Ok(rows.into_iter().map(CommentRow::into_domain).collect())
    }
}

impl DomainPort for PostgresTicketAdapter {}

#[async_trait]
impl HealthCheckable for PostgresTicketAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::pool_health(&self.pool, "postgres-tickets").await
    }
}

const TICKET_COLUMNS: &str = "ticket_id, ticket_number, customer_id, subject, description, \
     priority, status, assigned_to, escalated, first_response_due, resolution_due, \
     first_response_at, resolved_at, created_at, updated_at";

#[async_trait]
impl TicketPort for PostgresTicketAdapter {
    #[instrument(skip(self, _metadata), fields(ticket_id = %id))]
    async fn get_ticket(
        &self,
        id: TicketId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Ticket, PortError> {
        let sql = format!("SELECT {} FROM tickets WHERE ticket_id = $1", TICKET_COLUMNS);
        let row: Option<TicketRow> = sqlx::query_as(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        let mut ticket = row
            .ok_or_else(|| PortError::not_found("Ticket", id))?
            .into_domain()
            .map_err(PortError::from)?;
        ticket.comments = self.load_comments(id).await?;
        Ok(ticket)
    }

    async fn find_tickets(
        &self,
        query: TicketQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Ticket>, PortError> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM tickets WHERE 1=1", TICKET_COLUMNS));

        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(priority) = query.priority {
            qb.push(" AND priority = ").push_bind(priority.as_str());
        }
        if let Some(customer_id) = query.customer_id {
            qb.push(" AND customer_id = ").push_bind(Uuid::from(customer_id));
        }
        if let Some(assigned_to) = query.assigned_to {
            qb.push(" AND assigned_to = ").push_bind(Uuid::from(assigned_to));
        }
        if let Some(escalated) = query.escalated {
            qb.push(" AND escalated = ").push_bind(escalated);
        }
        if let Some(text) = &query.text {
            let pattern = format!("%{}%", text);
            qb.push(" AND (subject ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY created_at ASC");
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            qb.push(" OFFSET ").push_bind(offset as i64);
        }

        let rows: Vec<TicketRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        // Listings skip the comment join; callers fetch a single ticket when
        // they need the thread.
        rows.into_iter()
            .map(|r| r.into_domain().map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self, ticket, _metadata), fields(ticket_id = %ticket.id))]
    async fn insert_ticket(
        &self,
        ticket: &Ticket,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO tickets (ticket_id, ticket_number, customer_id, subject, description, \
             priority, status, assigned_to, escalated, first_response_due, resolution_due, \
             first_response_at, resolved_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(Uuid::from(ticket.id))
        .bind(&ticket.ticket_number)
        .bind(Uuid::from(ticket.customer_id))
        .bind(&ticket.subject)
        .bind(&ticket.description)
        .bind(ticket.priority.as_str())
        .bind(ticket.status.as_str())
        .bind(ticket.assigned_to.map(Uuid::from))
        .bind(ticket.escalated)
        .bind(ticket.sla.first_response_due)
        .bind(ticket.sla.resolution_due)
        .bind(ticket.first_response_at)
        .bind(ticket.resolved_at)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;
        Ok(())
    }

    #[instrument(skip(self, ticket, _metadata), fields(ticket_id = %ticket.id, status = ticket.status.as_str()))]
    async fn update_ticket(
        &self,
        ticket: &Ticket,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        let updated = sqlx::query(
            "UPDATE tickets SET subject = $2, description = $3, priority = $4, status = $5, \
             assigned_to = $6, escalated = $7, first_response_due = $8, resolution_due = $9, \
             first_response_at = $10, resolved_at = $11, updated_at = $12 WHERE ticket_id = $1",
        )
        .bind(Uuid::from(ticket.id))
        .bind(&ticket.subject)
        .bind(&ticket.description)
        .bind(ticket.priority.as_str())
        .bind(ticket.status.as_str())
        .bind(ticket.assigned_to.map(Uuid::from))
        .bind(ticket.escalated)
        .bind(ticket.sla.first_response_due)
        .bind(ticket.sla.resolution_due)
        .bind(ticket.first_response_at)
        .bind(ticket.resolved_at)
        .bind(ticket.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        if updated.rows_affected() == 0 {
            return Err(PortError::not_found("Ticket", ticket.id));
        }

        for comment in &ticket.comments {
            sqlx::query(
                "INSERT INTO ticket_comments (comment_id, ticket_id, author, body, is_internal, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (comment_id) DO NOTHING",
            )
            .bind(Uuid::from(comment.id))
            .bind(Uuid::from(comment.ticket_id))
            .bind(comment.author.map(Uuid::from))
            .bind(&comment.body)
            .bind(comment.is_internal)
            .bind(comment.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;
        Ok(())
    }
}

/// Database row for a ticket
#[derive(Debug, Clone, sqlx::FromRow)]
struct TicketRow {
    ticket_id: Uuid,
    ticket_number: String,
    customer_id: Uuid,
    subject: String,
    description: String,
    priority: String,
    status: String,
    assigned_to: Option<Uuid>,
    escalated: bool,
    first_response_due: DateTime<Utc>,
    resolution_due: DateTime<Utc>,
    first_response_at: Option<DateTime<Utc>>,
    resolved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_domain(self) -> Result<Ticket, DatabaseError> {
        Ok(Ticket {
            id: TicketId::from(self.ticket_id),
            ticket_number: self.ticket_number,
            customer_id: CustomerId::from(self.customer_id),
            subject: self.subject,
            description: self.description,
            priority: self
                .priority
                .parse()
                .map_err(|e| DatabaseError::decode("priority", e))?,
            status: self
                .status
                .parse()
                .map_err(|e| DatabaseError::decode("status", e))?,
            assigned_to: self.assigned_to.map(AgentId::from),
            escalated: self.escalated,
            sla: SlaDeadlines {
                first_response_due: self.first_response_due,
                resolution_due: self.resolution_due,
            },
            comments: Vec::new(),
            first_response_at: self.first_response_at,
            resolved_at: self.resolved_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for a ticket comment
#[derive(Debug, Clone, sqlx::FromRow)]
struct CommentRow {
    comment_id: Uuid,
    ticket_id: Uuid,
    author: Option<Uuid>,
    body: String,
    is_internal: bool,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_domain(self) -> TicketComment {
        TicketComment {
            id: CommentId::from(self.comment_id),
            ticket_id: TicketId::from(self.ticket_id),
            author: self.author.map(AgentId::from),
            body: self.body,
            is_internal: self.is_internal,
            created_at: self.created_at,
        }
    }
}
