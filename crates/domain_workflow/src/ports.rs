//! Workflow Domain Ports
//!
//! The `WorkQueuePort` trait persists queue entries. The internal adapter
//! lives in infra_db; the mock adapter here backs unit and API tests.

use async_trait::async_trait;
use uuid::Uuid;

use core_kernel::{
    AgentId, WorkItemId, PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult,
};

use crate::queue::{order_for_pickup, WorkItem, WorkItemKind, WorkPriority};

/// Query parameters for listing queue entries
#[derive(Debug, Clone, Default)]
pub struct WorkQueueQuery {
    /// Filter by case kind
    pub kind: Option<WorkItemKind>,
    /// Filter by priority
    pub priority: Option<WorkPriority>,
    /// Filter by claim state
    pub claimed: Option<bool>,
    /// Limit results
    pub limit: Option<u32>,
}

/// The main port trait for work-queue persistence
#[async_trait]
pub trait WorkQueuePort: DomainPort + HealthCheckable {
    /// Retrieves an item by ID
    async fn get_item(
        &self,
        id: WorkItemId,
        metadata: Option<OperationMetadata>,
    ) -> Result<WorkItem, PortError>;

    /// Lists queue entries in pickup order
    async fn list_items(
        &self,
        query: WorkQueueQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<WorkItem>, PortError>;

    /// Adds an item to the queue
    async fn enqueue(
        &self,
        item: &WorkItem,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Claims the highest-ranked unclaimed item for an agent
    ///
    /// Returns None when the queue has nothing unclaimed.
    async fn claim_next(
        &self,
        agent: AgentId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Option<WorkItem>, PortError>;

    /// Releases a claim held by the given agent
    async fn release(
        &self,
        id: WorkItemId,
        agent: AgentId,
        metadata: Option<OperationMetadata>,
    ) -> Result<WorkItem, PortError>;

    /// Removes the queue entry for a finished case
    async fn complete(
        &self,
        id: WorkItemId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Removes the queue entry tracking the given case, if one exists
    async fn complete_for_case(
        &self,
        case_id: Uuid,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// Mock implementation of WorkQueuePort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use core_kernel::AdapterHealth;

    /// In-memory mock implementation of WorkQueuePort
    #[derive(Debug, Default)]
    pub struct MockWorkQueuePort {
        items: Arc<RwLock<HashMap<WorkItemId, WorkItem>>>,
    }

    impl MockWorkQueuePort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockWorkQueuePort {}

    #[async_trait]
    impl HealthCheckable for MockWorkQueuePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-workqueue-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl WorkQueuePort for MockWorkQueuePort {
        async fn get_item(
            &self,
            id: WorkItemId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<WorkItem, PortError> {
            self.items
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("WorkItem", id))
        }

        async fn list_items(
            &self,
            query: WorkQueueQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<WorkItem>, PortError> {
            let items = self.items.read().await;
            let mut results: Vec<_> = items
                .values()
                .filter(|i| {
                    if let Some(kind) = query.kind {
                        if i.kind != kind {
                            return false;
                        }
                    }
                    if let Some(priority) = query.priority {
                        if i.priority != priority {
                            return false;
                        }
                    }
                    if let Some(claimed) = query.claimed {
                        if i.is_claimed() != claimed {
                            return false;
                        }
                    }
                    true
                })
                .cloned()
                .collect();

            order_for_pickup(&mut results);

            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }

            Ok(results)
        }

        async fn enqueue(
            &self,
            item: &WorkItem,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut items = self.items.write().await;
            if items.values().any(|i| i.case_id == item.case_id) {
                return Err(PortError::conflict(format!(
                    "case {} already queued",
                    item.case_id
                )));
            }
            items.insert(item.id, item.clone());
            Ok(())
        }

        async fn claim_next(
            &self,
            agent: AgentId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Option<WorkItem>, PortError> {
            let mut items = self.items.write().await;
            let mut unclaimed: Vec<_> = items
                .values()
                .filter(|i| !i.is_claimed())
                .cloned()
                .collect();
            order_for_pickup(&mut unclaimed);

            match unclaimed.into_iter().next() {
                None => Ok(None),
                Some(mut head) => {
                    head.claim(agent)
                        .map_err(|e| PortError::conflict(e.to_string()))?;
                    items.insert(head.id, head.clone());
                    Ok(Some(head))
                }
            }
        }

        async fn release(
            &self,
            id: WorkItemId,
            agent: AgentId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<WorkItem, PortError> {
            let mut items = self.items.write().await;
            let item = items
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("WorkItem", id))?;
            item.release(agent)
                .map_err(|e| PortError::conflict(e.to_string()))?;
            Ok(item.clone())
        }

        async fn complete(
            &self,
            id: WorkItemId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.items
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("WorkItem", id))
        }

        async fn complete_for_case(
            &self,
            case_id: Uuid,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut items = self.items.write().await;
            let found: Vec<_> = items
                .iter()
                .filter(|(_, i)| i.case_id == case_id)
                .map(|(id, _)| *id)
                .collect();
            for id in found {
                items.remove(&id);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::MockWorkQueuePort;

    #[tokio::test]
    async fn test_claim_next_takes_highest_priority() {
        let port = MockWorkQueuePort::new();
        let low = WorkItem::new(WorkItemKind::Ticket, Uuid::new_v4(), WorkPriority::Low);
        let high = WorkItem::new(WorkItemKind::Kyc, Uuid::new_v4(), WorkPriority::High);

        port.enqueue(&low, None).await.unwrap();
        port.enqueue(&high, None).await.unwrap();

        let agent = AgentId::new_v7();
        let claimed = port.claim_next(agent, None).await.unwrap().unwrap();
        assert_eq!(claimed.id, high.id);
        assert_eq!(claimed.claimed_by, Some(agent));
    }

    #[tokio::test]
    async fn test_claim_next_on_empty_queue() {
        let port = MockWorkQueuePort::new();
        let claimed = port.claim_next(AgentId::new_v7(), None).await.unwrap();
        assert!(claimed.is_none());
    }

    #[tokio::test]
    async fn test_claimed_item_not_reclaimed() {
        let port = MockWorkQueuePort::new();
        let item = WorkItem::new(WorkItemKind::Kyc, Uuid::new_v4(), WorkPriority::Medium);
        port.enqueue(&item, None).await.unwrap();

        let first = port.claim_next(AgentId::new_v7(), None).await.unwrap();
        assert!(first.is_some());

        let second = port.claim_next(AgentId::new_v7(), None).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_release_returns_item_to_queue() {
        let port = MockWorkQueuePort::new();
        let item = WorkItem::new(WorkItemKind::Ticket, Uuid::new_v4(), WorkPriority::High);
        port.enqueue(&item, None).await.unwrap();

        let agent = AgentId::new_v7();
        let claimed = port.claim_next(agent, None).await.unwrap().unwrap();
        port.release(claimed.id, agent, None).await.unwrap();

        let reclaimed = port.claim_next(AgentId::new_v7(), None).await.unwrap();
        assert!(reclaimed.is_some());
    }

    #[tokio::test]
    async fn test_release_by_other_agent_rejected() {
        let port = MockWorkQueuePort::new();
        let item = WorkItem::new(WorkItemKind::Ticket, Uuid::new_v4(), WorkPriority::High);
        port.enqueue(&item, None).await.unwrap();

        let holder = AgentId::new_v7();
        let claimed = port.claim_next(holder, None).await.unwrap().unwrap();

        let result = port.release(claimed.id, AgentId::new_v7(), None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_complete_removes_item() {
        let port = MockWorkQueuePort::new();
        let item = WorkItem::new(WorkItemKind::Kyc, Uuid::new_v4(), WorkPriority::Low);
        port.enqueue(&item, None).await.unwrap();

        port.complete(item.id, None).await.unwrap();
        assert!(port.get_item(item.id, None).await.is_err());
    }

    #[tokio::test]
    async fn test_complete_for_case_removes_entry() {
        let port = MockWorkQueuePort::new();
        let case_id = Uuid::new_v4();
        let item = WorkItem::new(WorkItemKind::Kyc, case_id, WorkPriority::Low);
        port.enqueue(&item, None).await.unwrap();

        port.complete_for_case(case_id, None).await.unwrap();
        let remaining = port.list_items(WorkQueueQuery::default(), None).await.unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_enqueue_same_case_twice_conflicts() {
        let port = MockWorkQueuePort::new();
        let case_id = Uuid::new_v4();
        let a = WorkItem::new(WorkItemKind::Ticket, case_id, WorkPriority::Low);
        let b = WorkItem::new(WorkItemKind::Ticket, case_id, WorkPriority::High);

        port.enqueue(&a, None).await.unwrap();
        assert!(port.enqueue(&b, None).await.is_err());
    }
}
