//! Lending Domain Ports
//!
//! The `EmiSchedulePort` trait defines all operations the lending domain
//! needs from its data source. The internal adapter lives in infra_db; the
//! mock adapter here backs unit and API tests.

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{
    CustomerId, LoanId, PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult,
};

use crate::schedule::{EmiSchedule, ScheduleStatus};

/// Query parameters for finding schedules
#[derive(Debug, Clone, Default)]
pub struct ScheduleQuery {
    /// Filter by status
    pub status: Option<ScheduleStatus>,
    /// Filter by borrower
    pub customer_id: Option<CustomerId>,
    /// Filter by auto-debit flag
    pub auto_debit: Option<bool>,
    /// Only schedules due on or before this date
    pub due_on_or_before: Option<NaiveDate>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl ScheduleQuery {
    /// Creates a query for all schedules of a borrower
    pub fn by_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    /// Creates a query for auto-debit schedules due by a date
    ///
    /// This is the sweep the collection job runs each morning.
    pub fn due_for_auto_debit(date: NaiveDate) -> Self {
        Self {
            status: Some(ScheduleStatus::Active),
            auto_debit: Some(true),
            due_on_or_before: Some(date),
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

/// The main port trait for EMI schedule persistence
#[async_trait]
pub trait EmiSchedulePort: DomainPort + HealthCheckable {
    /// Retrieves a schedule by ID, including recorded payments
    async fn get_schedule(
        &self,
        id: LoanId,
        metadata: Option<OperationMetadata>,
    ) -> Result<EmiSchedule, PortError>;

    /// Finds schedules matching the query criteria, oldest first
    async fn find_schedules(
        &self,
        query: ScheduleQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<EmiSchedule>, PortError>;

    /// Persists a newly disbursed schedule
    async fn insert_schedule(
        &self,
        schedule: &EmiSchedule,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Persists the current state of a schedule (payments, flags, status)
    async fn update_schedule(
        &self,
        schedule: &EmiSchedule,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// Mock implementation of EmiSchedulePort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use core_kernel::AdapterHealth;

    /// In-memory mock implementation of EmiSchedulePort
    #[derive(Debug, Default)]
    pub struct MockEmiSchedulePort {
        schedules: Arc<RwLock<HashMap<LoanId, EmiSchedule>>>,
    }

    impl MockEmiSchedulePort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with schedules for testing
        pub async fn with_schedules(schedules: Vec<EmiSchedule>) -> Self {
            let port = Self::new();
            for schedule in schedules {
                port.schedules.write().await.insert(schedule.id, schedule);
            }
            port
        }
    }

    impl DomainPort for MockEmiSchedulePort {}

    #[async_trait]
    impl HealthCheckable for MockEmiSchedulePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-emi-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl EmiSchedulePort for MockEmiSchedulePort {
        async fn get_schedule(
            &self,
            id: LoanId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<EmiSchedule, PortError> {
            self.schedules
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("EmiSchedule", id))
        }

        async fn find_schedules(
            &self,
            query: ScheduleQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<EmiSchedule>, PortError> {
            let schedules = self.schedules.read().await;
            let mut results: Vec<_> = schedules
                .values()
                .filter(|s| {
                    if let Some(status) = query.status {
                        if s.status != status {
                            return false;
                        }
                    }
                    if let Some(customer_id) = query.customer_id {
                        if s.customer_id != customer_id {
                            return false;
                        }
                    }
                    if let Some(auto_debit) = query.auto_debit {
                        if s.auto_debit != auto_debit {
                            return false;
                        }
                    }
                    if let Some(cutoff) = query.due_on_or_before {
                        match s.next_due_date {
                            Some(due) if due <= cutoff => {}
                            _ => return false,
                        }
                    }
                    true
                })
                .cloned()
                .collect();

            results.sort_by_key(|s| s.created_at);

            if let Some(offset) = query.offset {
                results = results.into_iter().skip(offset as usize).collect();
            }
            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }

            Ok(results)
        }

        async fn insert_schedule(
            &self,
            schedule: &EmiSchedule,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut schedules = self.schedules.write().await;
            if schedules.contains_key(&schedule.id) {
                return Err(PortError::conflict(format!(
                    "schedule {} already exists",
                    schedule.id
                )));
            }
            schedules.insert(schedule.id, schedule.clone());
            Ok(())
        }

        async fn update_schedule(
            &self,
            schedule: &EmiSchedule,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            let mut schedules = self.schedules.write().await;
            if !schedules.contains_key(&schedule.id) {
                return Err(PortError::not_found("EmiSchedule", schedule.id));
            }
            schedules.insert(schedule.id, schedule.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::MockEmiSchedulePort;
    use crate::schedule::PaymentChannel;
    use core_kernel::{Currency, Money, Rate};
    use rust_decimal_macros::dec;

    fn schedule(auto_debit: bool) -> EmiSchedule {
        EmiSchedule::disburse(
            CustomerId::new_v7(),
            Money::new(dec!(60000), Currency::INR),
            Rate::from_percentage(dec!(11)),
            6,
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            auto_debit,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_mock_port_insert_and_get() {
        let port = MockEmiSchedulePort::new();
        let s = schedule(true);

        port.insert_schedule(&s, None).await.unwrap();

        let retrieved = port.get_schedule(s.id, None).await.unwrap();
        assert_eq!(retrieved.id, s.id);
        assert!(retrieved.auto_debit);
    }

    #[tokio::test]
    async fn test_mock_port_auto_debit_sweep() {
        let port = MockEmiSchedulePort::with_schedules(vec![schedule(true), schedule(false)]).await;

        let due = port
            .find_schedules(
                ScheduleQuery::due_for_auto_debit(NaiveDate::from_ymd_opt(2026, 4, 10).unwrap()),
                None,
            )
            .await
            .unwrap();
        assert_eq!(due.len(), 1);
        assert!(due[0].auto_debit);
    }

    #[tokio::test]
    async fn test_mock_port_update_round_trip() {
        let port = MockEmiSchedulePort::new();
        let mut s = schedule(false);
        port.insert_schedule(&s, None).await.unwrap();

        s.record_payment(PaymentChannel::Manual).unwrap();
        port.update_schedule(&s, None).await.unwrap();

        let retrieved = port.get_schedule(s.id, None).await.unwrap();
        assert_eq!(retrieved.paid_installments, 1);
        assert_eq!(retrieved.payments.len(), 1);
    }
}
