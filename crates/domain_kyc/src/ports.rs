//! KYC Domain Ports
//!
//! This module defines the port interface for the KYC domain, enabling
//! swappable implementations (internal database, mock, etc.).
//!
//! # Architecture
//!
//! The `KycCasePort` trait defines all operations the KYC domain needs from
//! its data source. Two adapters implement it:
//!
//! - **Internal Adapter**: PostgreSQL (infra_db)
//! - **Mock Adapter**: in-memory, for testing without external dependencies
//!
//! Application services and API handlers receive the trait object and never
//! see the concrete adapter:
//!
//! ```rust,ignore
//! pub struct KycService {
//!     cases: Arc<dyn KycCasePort>,
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{
    AgentId, CustomerId, KycCaseId, PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult,
};

use crate::case::{KycCase, KycStatus, RiskScore};

/// Query parameters for finding cases
#[derive(Debug, Clone, Default)]
pub struct KycCaseQuery {
    /// Filter by status
    pub status: Option<KycStatus>,
    /// Filter by risk score
    pub risk_score: Option<RiskScore>,
    /// Filter by customer
    pub customer_id: Option<CustomerId>,
    /// Filter by assigned reviewer
    pub assigned_to: Option<AgentId>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl KycCaseQuery {
    /// Creates a query for all cases in a given status
    pub fn by_status(status: KycStatus) -> Self {
        Self {
            status: Some(status),
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

/// A recorded status change, oldest first in history listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KycStatusChange {
    pub status: KycStatus,
    pub changed_by: Option<AgentId>,
    pub reason: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// The main port trait for KYC case persistence
///
/// All methods are async and return `Result<T, PortError>` for consistent
/// error handling across adapter implementations.
#[async_trait]
pub trait KycCasePort: DomainPort + HealthCheckable {
    /// Retrieves a case by ID
    async fn get_case(
        &self,
        id: KycCaseId,
        metadata: Option<OperationMetadata>,
    ) -> Result<KycCase, PortError>;

    /// Finds cases matching the query criteria, oldest submission first
    async fn find_cases(
        &self,
        query: KycCaseQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<KycCase>, PortError>;

    /// Persists a newly submitted case and its initial status
    async fn insert_case(
        &self,
        case: &KycCase,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Persists a case after a status transition, appending to its history
    async fn persist_transition(
        &self,
        case: &KycCase,
        changed_by: Option<AgentId>,
        reason: Option<&str>,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Returns the recorded status changes for a case, oldest first
    async fn status_history(
        &self,
        id: KycCaseId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<KycStatusChange>, PortError>;
}

/// Mock implementation of KycCasePort for testing
///
/// Stores cases in memory and is useful for unit testing without database
/// dependencies.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use core_kernel::AdapterHealth;

    /// In-memory mock implementation of KycCasePort
    #[derive(Debug, Default)]
    pub struct MockKycCasePort {
        cases: Arc<RwLock<HashMap<KycCaseId, KycCase>>>,
        history: Arc<RwLock<HashMap<KycCaseId, Vec<KycStatusChange>>>>,
    }

    impl MockKycCasePort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with cases for testing
        pub async fn with_cases(cases: Vec<KycCase>) -> Self {
            let port = Self::new();
            for case in cases {
                port.insert_case(&case, None).await.expect("mock insert");
            }
            port
        }
    }

    impl DomainPort for MockKycCasePort {}

    #[async_trait]
    impl HealthCheckable for MockKycCasePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-kyc-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl KycCasePort for MockKycCasePort {
        async fn get_case(
            &self,
            id: KycCaseId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<KycCase, PortError> {
            self.cases
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("KycCase", id))
        }

        async fn find_cases(
            &self,
            query: KycCaseQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<KycCase>, PortError> {
            let cases = self.cases.read().await;
            let mut results: Vec<_> = cases
                .values()
                .filter(|c| {
                    if let Some(status) = query.status {
                        if c.status != status {
                            return false;
                        }
                    }
                    if let Some(risk) = query.risk_score {
                        if c.risk_score != risk {
                            return false;
                        }
                    }
                    if let Some(customer_id) = query.customer_id {
                        if c.customer_id != customer_id {
                            return false;
                        }
                    }
                    if let Some(assigned_to) = query.assigned_to {
                        if c.assigned_to != Some(assigned_to) {
                            return false;
                        }
                    }
                    true
                })
                .cloned()
                .collect();

            results.sort_by_key(|c| c.created_at);

            if let Some(offset) = query.offset {
                results = results.into_iter().skip(offset as usize).collect();
            }
            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }

            Ok(results)
        }

        async fn insert_case(
            &self,
            case: &KycCase,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut cases = self.cases.write().await;
            if cases.contains_key(&case.id) {
                return Err(PortError::conflict(format!("case {} already exists", case.id)));
            }
            cases.insert(case.id, case.clone());

            self.history.write().await.insert(
                case.id,
                vec![KycStatusChange {
                    status: case.status,
                    changed_by: None,
                    reason: None,
                    changed_at: case.created_at,
                }],
            );
            Ok(())
        }

        async fn persist_transition(
            &self,
            case: &KycCase,
            changed_by: Option<AgentId>,
            reason: Option<&str>,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut cases = self.cases.write().await;
            if !cases.contains_key(&case.id) {
                return Err(PortError::not_found("KycCase", case.id));
            }
            cases.insert(case.id, case.clone());

            self.history
                .write()
                .await
                .entry(case.id)
                .or_default()
                .push(KycStatusChange {
                    status: case.status,
                    changed_by,
                    reason: reason.map(|r| r.to_string()),
                    changed_at: case.updated_at,
                });
            Ok(())
        }

        async fn status_history(
            &self,
            id: KycCaseId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<KycStatusChange>, PortError> {
            self.history
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("KycCase", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::MockKycCasePort;
    use crate::case::DocumentKind;
    use crate::decision::ReviewDecision;
    use crate::screening::ScreeningOutcome;

    fn submitted_case() -> KycCase {
        KycCase::submit(
            CustomerId::new_v7(),
            DocumentKind::Passport,
            "P1234567".to_string(),
            None,
            ScreeningOutcome::clean(),
        )
    }

    #[tokio::test]
    async fn test_mock_port_insert_and_get() {
        let port = MockKycCasePort::new();
        let case = submitted_case();

        port.insert_case(&case, None).await.unwrap();

        let retrieved = port.get_case(case.id, None).await.unwrap();
        assert_eq!(retrieved.id, case.id);
        assert_eq!(retrieved.status, KycStatus::Pending);
    }

    #[tokio::test]
    async fn test_mock_port_duplicate_insert_conflicts() {
        let port = MockKycCasePort::new();
        let case = submitted_case();

        port.insert_case(&case, None).await.unwrap();
        assert!(port.insert_case(&case, None).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_port_not_found() {
        let port = MockKycCasePort::new();
        let result = port.get_case(KycCaseId::new_v7(), None).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_mock_port_find_by_status() {
        let port = MockKycCasePort::new();
        let mut in_review = submitted_case();
        in_review.start_review(AgentId::new_v7()).unwrap();

        port.insert_case(&submitted_case(), None).await.unwrap();
        port.insert_case(&in_review, None).await.unwrap();

        let pending = port
            .find_cases(KycCaseQuery::by_status(KycStatus::Pending), None)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, KycStatus::Pending);
    }

    #[tokio::test]
    async fn test_mock_port_history_tracks_transitions() {
        let port = MockKycCasePort::new();
        let mut case = submitted_case();
        let reviewer = AgentId::new_v7();

        port.insert_case(&case, None).await.unwrap();

        case.start_review(reviewer).unwrap();
        port.persist_transition(&case, Some(reviewer), None, None)
            .await
            .unwrap();

        case.decide(ReviewDecision::reject(reviewer, "blurred document scan"))
            .unwrap();
        port.persist_transition(&case, Some(reviewer), Some("blurred document scan"), None)
            .await
            .unwrap();

        let history = port.status_history(case.id, None).await.unwrap();
        let statuses: Vec<_> = history.iter().map(|h| h.status).collect();
        assert_eq!(
            statuses,
            vec![KycStatus::Pending, KycStatus::Review, KycStatus::Rejected]
        );
        assert_eq!(history[2].reason.as_deref(), Some("blurred document scan"));
    }

    #[tokio::test]
    async fn test_mock_port_health_check() {
        let port = MockKycCasePort::new();
        let result = port.health_check().await;
        assert_eq!(result.status, core_kernel::AdapterHealth::Healthy);
    }
}
