//! PostgreSQL Lending Adapter
//!
//! Implements `EmiSchedulePort` over the emi_schedules and emi_payments
//! tables. Payments are append-only and upserted by sequence number.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{
    CustomerId, LoanId, Money, Rate, PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult,
};
use domain_lending::{
    EmiSchedule, EmiSchedulePort, InstallmentPayment, ScheduleQuery,
};

use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of the EmiSchedulePort trait
#[derive(Debug, Clone)]
pub struct PostgresLendingAdapter {
    pool: PgPool,
}

impl PostgresLendingAdapter {
    /// Creates a new PostgreSQL lending adapter
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_payments(&self, loan_id: LoanId) -> Result<Vec<PaymentRow>, PortError> {
        sqlx::query_as(
            "SELECT loan_id, sequence, amount, currency, channel, paid_at \
             FROM emi_payments WHERE loan_id = $1 ORDER BY sequence ASC",
        )
        .bind(Uuid::from(loan_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))
    }
}

impl DomainPort for PostgresLendingAdapter {}

#[async_trait]
impl HealthCheckable for PostgresLendingAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::pool_health(&self.pool, "postgres-lending").await
    }
}

const SCHEDULE_COLUMNS: &str = "loan_id, loan_number, customer_id, principal, currency, \
     annual_rate, installment_amount, paid_installments, total_installments, \
     next_due_date, cycle_anchor_day, auto_debit, status, created_at, updated_at";

#[async_trait]
impl EmiSchedulePort for PostgresLendingAdapter {
    #[instrument(skip(self, _metadata), fields(loan_id = %id))]
    async fn get_schedule(
        &self,
        id: LoanId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<EmiSchedule, PortError> {
        let sql = format!("SELECT {} FROM emi_schedules WHERE loan_id = $1", SCHEDULE_COLUMNS);
        let row: Option<ScheduleRow> = sqlx::query_as(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        let row = row.ok_or_else(|| PortError::not_found("EmiSchedule", id))?;
        let payments = self.load_payments(id).await?;
        row.into_domain(payments).map_err(PortError::from)
    }

    async fn find_schedules(
        &self,
        query: ScheduleQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<EmiSchedule>, PortError> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM emi_schedules WHERE 1=1", SCHEDULE_COLUMNS));

        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(customer_id) = query.customer_id {
            qb.push(" AND customer_id = ").push_bind(Uuid::from(customer_id));
        }
        if let Some(auto_debit) = query.auto_debit {
            qb.push(" AND auto_debit = ").push_bind(auto_debit);
        }
        if let Some(cutoff) = query.due_on_or_before {
            qb.push(" AND next_due_date IS NOT NULL AND next_due_date <= ")
                .push_bind(cutoff);
        }
        qb.push(" ORDER BY created_at ASC");
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            qb.push(" OFFSET ").push_bind(offset as i64);
        }

        let rows: Vec<ScheduleRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        // Listings skip the payment join; callers fetch a single schedule
        // when they need the full ledger.
        rows.into_iter()
            .map(|r| r.into_domain(Vec::new()).map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self, schedule, _metadata), fields(loan_id = %schedule.id))]
    async fn insert_schedule(
        &self,
        schedule: &EmiSchedule,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO emi_schedules (loan_id, loan_number, customer_id, principal, currency, \
             annual_rate, installment_amount, paid_installments, total_installments, \
             next_due_date, cycle_anchor_day, auto_debit, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(Uuid::from(schedule.id))
        .bind(&schedule.loan_number)
        .bind(Uuid::from(schedule.customer_id))
        .bind(schedule.principal.amount())
        .bind(schedule.principal.currency().code())
        .bind(schedule.annual_rate.as_decimal())
        .bind(schedule.installment_amount.amount())
        .bind(schedule.paid_installments as i32)
        .bind(schedule.total_installments as i32)
        .bind(schedule.next_due_date)
        .bind(schedule.cycle_anchor_day as i32)
        .bind(schedule.auto_debit)
        .bind(schedule.status.as_str())
        .bind(schedule.created_at)
        .bind(schedule.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;
        Ok(())
    }

    #[instrument(skip(self, schedule, _metadata), fields(loan_id = %schedule.id, paid = schedule.paid_installments))]
    async fn update_schedule(
        &self,
        schedule: &EmiSchedule,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        let updated = sqlx::query(
            "UPDATE emi_schedules SET paid_installments = $2, next_due_date = $3, \
             auto_debit = $4, status = $5, updated_at = $6 WHERE loan_id = $1",
        )
        .bind(Uuid::from(schedule.id))
        .bind(schedule.paid_installments as i32)
        .bind(schedule.next_due_date)
        .bind(schedule.auto_debit)
        .bind(schedule.status.as_str())
        .bind(schedule.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        if updated.rows_affected() == 0 {
            return Err(PortError::not_found("EmiSchedule", schedule.id));
        }

        for payment in &schedule.payments {
            sqlx::query(
                "INSERT INTO emi_payments (loan_id, sequence, amount, currency, channel, paid_at) \
                 VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (loan_id, sequence) DO NOTHING",
            )
            .bind(Uuid::from(schedule.id))
            .bind(payment.sequence as i32)
            .bind(payment.amount.amount())
            .bind(payment.amount.currency().code())
            .bind(payment.channel.as_str())
            .bind(payment.paid_at)
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

/// Database row for an EMI schedule
#[derive(Debug, Clone, sqlx::FromRow)]
struct ScheduleRow {
    loan_id: Uuid,
    loan_number: String,
    customer_id: Uuid,
    principal: Decimal,
    currency: String,
    annual_rate: Decimal,
    installment_amount: Decimal,
    paid_installments: i32,
    total_installments: i32,
    next_due_date: Option<NaiveDate>,
    cycle_anchor_day: i32,
    auto_debit: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ScheduleRow {
    fn into_domain(self, payments: Vec<PaymentRow>) -> Result<EmiSchedule, DatabaseError> {
        let currency = self
            .currency
            .parse()
            .map_err(|e| DatabaseError::decode("currency", e))?;

        let payments = payments
            .into_iter()
            .map(|p| p.into_domain(currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EmiSchedule {
            id: LoanId::from(self.loan_id),
            loan_number: self.loan_number,
            customer_id: CustomerId::from(self.customer_id),
            principal: Money::new(self.principal, currency),
            annual_rate: Rate::new(self.annual_rate),
            installment_amount: Money::new(self.installment_amount, currency),
            paid_installments: self.paid_installments as u32,
            total_installments: self.total_installments as u32,
            next_due_date: self.next_due_date,
            cycle_anchor_day: self.cycle_anchor_day as u32,
            auto_debit: self.auto_debit,
            status: self
                .status
                .parse()
                .map_err(|e| DatabaseError::decode("status", e))?,
            payments,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for an installment payment
#[derive(Debug, Clone, sqlx::FromRow)]
struct PaymentRow {
    #[allow(dead_code)]
    loan_id: Uuid,
    sequence: i32,
    amount: Decimal,
    currency: String,
    channel: String,
    paid_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_domain(self, currency: core_kernel::Currency) -> Result<InstallmentPayment, DatabaseError> {
        // Payments inherit the schedule currency; the stored code is kept for
        // audit and checked on the way out.
        let stored: core_kernel::Currency = self
            .currency
            .parse()
            .map_err(|e| DatabaseError::decode("currency", e))?;
        if stored != currency {
            return Err(DatabaseError::decode(
                "currency",
                format!("payment currency {} disagrees with schedule {}", stored, currency),
            ));
        }

        Ok(InstallmentPayment {
            sequence: self.sequence as u32,
            amount: Money::new(self.amount, currency),
            channel: self
                .channel
                .parse()
                .map_err(|e| DatabaseError::decode("channel", e))?,
            paid_at: self.paid_at,
        })
    }
}
