//! Ticket Domain Ports
//!
//! The `TicketPort` trait defines all operations the support domain needs
//! from its data source. The internal adapter lives in infra_db; the mock
//! adapter here backs unit and API tests.

use async_trait::async_trait;

use core_kernel::{
    AgentId, CustomerId, TicketId, PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult,
};

use crate::ticket::{Ticket, TicketPriority, TicketStatus};

/// Query parameters for finding tickets
#[derive(Debug, Clone, Default)]
pub struct TicketQuery {
    /// Filter by status
    pub status: Option<TicketStatus>,
    /// Filter by priority
    pub priority: Option<TicketPriority>,
    /// Filter by customer
    pub customer_id: Option<CustomerId>,
    /// Filter by assigned agent
    pub assigned_to: Option<AgentId>,
    /// Filter by escalation flag
    pub escalated: Option<bool>,
    /// Substring match against subject and description
    pub text: Option<String>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl TicketQuery {
    /// Creates a query for all tickets in a given status
    pub fn by_status(status: TicketStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Creates a query matching subject/description text
    pub fn by_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// The main port trait for ticket persistence
#[async_trait]
pub trait TicketPort: DomainPort + HealthCheckable {
    /// Retrieves a ticket by ID, including comments
    async fn get_ticket(
        &self,
        id: TicketId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Ticket, PortError>;

    /// Finds tickets matching the query criteria, oldest first
    async fn find_tickets(
        &self,
        query: TicketQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Ticket>, PortError>;

    /// Persists a newly opened ticket
    async fn insert_ticket(
        &self,
        ticket: &Ticket,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Persists the current state of a ticket (status, assignment, comments)
    async fn update_ticket(
        &self,
        ticket: &Ticket,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// Mock implementation of TicketPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use core_kernel::AdapterHealth;

    /// In-memory mock implementation of TicketPort
    #[derive(Debug, Default)]
    pub struct MockTicketPort {
        tickets: Arc<RwLock<HashMap<TicketId, Ticket>>>,
    }

    impl MockTicketPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with tickets for testing
        pub async fn with_tickets(tickets: Vec<Ticket>) -> Self {
            let port = Self::new();
            for ticket in tickets {
                port.tickets.write().await.insert(ticket.id, ticket);
            }
            port
        }
    }

    impl DomainPort for MockTicketPort {}

    #[async_trait]
    impl HealthCheckable for MockTicketPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-ticket-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl TicketPort for MockTicketPort {
        async fn get_ticket(
            &self,
            id: TicketId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Ticket, PortError> {
            self.tickets
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Ticket", id))
        }

        async fn find_tickets(
            &self,
            query: TicketQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Ticket>, PortError> {
            let tickets = self.tickets.read().await;
            let needle = query.text.as_ref().map(|t| t.to_lowercase());
            let mut results: Vec<_> = tickets
                .values()
                .filter(|t| {
                    if let Some(status) = query.status {
                        if t.status != status {
                            return false;
                        }
                    }
                    if let Some(priority) = query.priority {
                        if t.priority != priority {
                            return false;
                        }
                    }
                    if let Some(customer_id) = query.customer_id {
                        if t.customer_id != customer_id {
                            return false;
                        }
                    }
                    if let Some(assigned_to) = query.assigned_to {
                        if t.assigned_to != Some(assigned_to) {
                            return false;
                        }
                    }
                    if let Some(escalated) = query.escalated {
                        if t.escalated != escalated {
                            return false;
                        }
                    }
                    if let Some(ref needle) = needle {
                        let haystack =
                            format!("{} {}", t.subject, t.description).to_lowercase();
                        if !haystack.contains(needle.as_str()) {
                            return false;
                        }
                    }
                    true
                })
                .cloned()
                .collect();

            results.sort_by_key(|t| t.created_at);

            if let Some(offset) = query.offset {
                results = results.into_iter().skip(offset as usize).collect();
            }
            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }

            Ok(results)
        }

        async fn insert_ticket(
            &self,
            ticket: &Ticket,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut tickets = self.tickets.write().await;
            if tickets.contains_key(&ticket.id) {
                return Err(PortError::conflict(format!(
                    "ticket {} already exists",
                    ticket.id
                )));
            }
            tickets.insert(ticket.id, ticket.clone());
            Ok(())
        }

        async fn update_ticket(
            &self,
            ticket: &Ticket,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut tickets = self.tickets.write().await;
            if !tickets.contains_key(&ticket.id) {
                return Err(PortError::not_found("Ticket", ticket.id));
            }
            tickets.insert(ticket.id, ticket.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::MockTicketPort;

    fn open_ticket(subject: &str) -> Ticket {
        Ticket::open(
            CustomerId::new_v7(),
            subject,
            "Description for the desk.",
            TicketPriority::Low,
        )
    }

    #[tokio::test]
    async fn test_mock_port_insert_and_get() {
        let port = MockTicketPort::new();
        let ticket = open_ticket("UPI transfer failed");

        port.insert_ticket(&ticket, None).await.unwrap();

        let retrieved = port.get_ticket(ticket.id, None).await.unwrap();
        assert_eq!(retrieved.id, ticket.id);
        assert_eq!(retrieved.subject, "UPI transfer failed");
    }

    #[tokio::test]
    async fn test_mock_port_text_filter() {
        let port = MockTicketPort::with_tickets(vec![
            open_ticket("UPI transfer failed"),
            open_ticket("Statement download broken"),
        ])
        .await;

        let found = port
            .find_tickets(TicketQuery::by_text("upi"), None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].subject, "UPI transfer failed");
    }

    #[tokio::test]
    async fn test_mock_port_update_round_trip() {
        let port = MockTicketPort::new();
        let mut ticket = open_ticket("Card dispute");
        port.insert_ticket(&ticket, None).await.unwrap();

        ticket.update_status(TicketStatus::InProgress).unwrap();
        port.update_ticket(&ticket, None).await.unwrap();

        let retrieved = port.get_ticket(ticket.id, None).await.unwrap();
        assert_eq!(retrieved.status, TicketStatus::InProgress);
    }

    #[tokio::test]
    async fn test_mock_port_update_missing_ticket() {
        let port = MockTicketPort::new();
        let ticket = open_ticket("Ghost");
        let result = port.update_ticket(&ticket, None).await;
        assert!(result.unwrap_err().is_not_found());
    }
}
