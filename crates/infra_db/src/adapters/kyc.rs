//! PostgreSQL KYC Adapter
//!
//! Implements `KycCasePort` over the kyc_cases and kyc_status_history
//! tables. Status transitions update the case row and append the history row
//! in one transaction, so history can never disagree with the case.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{
    AgentId, CustomerId, KycCaseId, PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult,
};
use domain_kyc::{
    KycCase, KycCasePort, KycCaseQuery, KycStatus, DocumentKind,
    ports::KycStatusChange,
};

use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of the KycCasePort trait
#[derive(Debug, Clone)]
pub struct PostgresKycAdapter {
    pool: PgPool,
}

impl PostgresKycAdapter {
    /// Creates a new PostgreSQL KYC adapter
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresKycAdapter {}

#[async_trait]
impl HealthCheckable for PostgresKycAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::pool_health(&self.pool, "postgres-kyc").await
    }
}

const CASE_COLUMNS: &str = "case_id, case_number, customer_id, document_kind, document_number, \
     document_expiry, status, risk_score, screening, rejection_reason, \
     assigned_to, decided_by, decided_at, created_at, updated_at";

#[async_trait]
impl KycCasePort for PostgresKycAdapter {
    #[instrument(skip(self, _metadata), fields(case_id = %id))]
    async fn get_case(
        &self,
        id: KycCaseId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<KycCase, PortError> {
        let sql = format!("SELECT {} FROM kyc_cases WHERE case_id = $1", CASE_COLUMNS);
        let row: Option<KycCaseRow> = sqlx::query_as(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        row.ok_or_else(|| PortError::not_found("KycCase", id))?
            .into_domain()
            .map_err(PortError::from)
    }

    async fn find_cases(
        &self,
        query: KycCaseQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<KycCase>, PortError> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM kyc_cases WHERE 1=1", CASE_COLUMNS));

        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(risk) = query.risk_score {
            qb.push(" AND risk_score = ").push_bind(risk.as_str());
        }
        if let Some(customer_id) = query.customer_id {
            qb.push(" AND customer_id = ").push_bind(Uuid::from(customer_id));
        }
        if let Some(assigned_to) = query.assigned_to {
            qb.push(" AND assigned_to = ").push_bind(Uuid::from(assigned_to));
        }
        qb.push(" ORDER BY created_at ASC");
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            qb.push(" OFFSET ").push_bind(offset as i64);
        }

        let rows: Vec<KycCaseRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        rows.into_iter()
            .map(|r| r.into_domain().map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self, case, _metadata), fields(case_id = %case.id))]
    async fn insert_case(
        &self,
        case: &KycCase,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let screening = case
            .screening
            .as_ref()
            .map(|s| serde_json::to_string(s))
            .transpose()
            .map_err(|e| PortError::internal(e.to_string()))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        sqlx::query(
            "INSERT INTO kyc_cases (case_id, case_number, customer_id, document_kind, \
             document_number, document_expiry, status, risk_score, screening, \
             rejection_reason, assigned_to, decided_by, decided_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(Uuid::from(case.id))
        .bind(&case.case_number)
        .bind(Uuid::from(case.customer_id))
        .bind(case.document_kind.as_str())
        .bind(&case.document_number)
        .bind(case.document_expiry)
        .bind(case.status.as_str())
        .bind(case.risk_score.as_str())
        .bind(screening)
        .bind(&case.rejection_reason)
        .bind(case.assigned_to.map(Uuid::from))
        .bind(case.decided_by.map(Uuid::from))
        .bind(case.decided_at)
        .bind(case.created_at)
        .bind(case.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        insert_history(&mut tx, case.id, case.status, None, None, case.created_at).await?;

        tx.commit()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;
        Ok(())
    }

    #[instrument(skip(self, case, _metadata), fields(case_id = %case.id, status = case.status.as_str()))]
    async fn persist_transition(
        &self,
        case: &KycCase,
        changed_by: Option<AgentId>,
        reason: Option<&str>,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        let updated = sqlx::query(
            "UPDATE kyc_cases SET status = $2, rejection_reason = $3, assigned_to = $4, \
             decided_by = $5, decided_at = $6, updated_at = $7 WHERE case_id = $1",
        )
        .bind(Uuid::from(case.id))
        .bind(case.status.as_str())
        .bind(&case.rejection_reason)
        .bind(case.assigned_to.map(Uuid::from))
        .bind(case.decided_by.map(Uuid::from))
        .bind(case.decided_at)
        .bind(case.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        if updated.rows_affected() == 0 {
            return Err(PortError::not_found("KycCase", case.id));
        }

        insert_history(&mut tx, case.id, case.status, changed_by, reason, case.updated_at).await?;

        tx.commit()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;
        Ok(())
    }

    async fn status_history(
        &self,
        id: KycCaseId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<KycStatusChange>, PortError> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            "SELECT status, changed_by, reason, changed_at FROM kyc_status_history \
             WHERE case_id = $1 ORDER BY changed_at ASC",
        )
        .bind(Uuid::from(id))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        if rows.is_empty() {
            return Err(PortError::not_found("KycCase", id));
        }

        rows.into_iter()
            .map(|r| r.into_domain().map_err(PortError::from))
            .collect()
    }
}

async fn insert_history(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    case_id: KycCaseId,
    status: KycStatus,
    changed_by: Option<AgentId>,
    reason: Option<&str>,
    changed_at: DateTime<Utc>,
) -> Result<(), PortError> {
    sqlx::query(
        "INSERT INTO kyc_status_history (history_id, case_id, status, changed_by, reason, changed_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(Uuid::new_v4())
    .bind(Uuid::from(case_id))
    .bind(status.as_str())
    .bind(changed_by.map(Uuid::from))
    .bind(reason)
    .bind(changed_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| PortError::from(DatabaseError::from(&e)))?;
    Ok(())
}

/// Database row for a KYC case
#[derive(Debug, Clone, sqlx::FromRow)]
struct KycCaseRow {
    case_id: Uuid,
    case_number: String,
    customer_id: Uuid,
    document_kind: String,
    document_number: String,
    document_expiry: Option<NaiveDate>,
    status: String,
    risk_score: String,
    screening: Option<String>,
    rejection_reason: Option<String>,
    assigned_to: Option<Uuid>,
    decided_by: Option<Uuid>,
    decided_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl KycCaseRow {
    fn into_domain(self) -> Result<KycCase, DatabaseError> {
        let status: KycStatus = self
            .status
            .parse()
            .map_err(|e| DatabaseError::decode("status", e))?;
        let risk_score = self
            .risk_score
            .parse()
            .map_err(|e| DatabaseError::decode("risk_score", e))?;
        let screening = self
            .screening
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| DatabaseError::decode("screening", e))?;

        Ok(KycCase {
            id: KycCaseId::from(self.case_id),
            case_number: self.case_number,
            customer_id: CustomerId::from(self.customer_id),
            document_kind: DocumentKind::parse(&self.document_kind),
            document_number: self.document_number,
            document_expiry: self.document_expiry,
            status,
            risk_score,
            screening,
            rejection_reason: self.rejection_reason,
            assigned_to: self.assigned_to.map(AgentId::from),
            decided_by: self.decided_by.map(AgentId::from),
            decided_at: self.decided_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for a status-history entry
#[derive(Debug, Clone, sqlx::FromRow)]
struct HistoryRow {
    status: String,
    changed_by: Option<Uuid>,
    reason: Option<String>,
    changed_at: DateTime<Utc>,
}

impl HistoryRow {
    fn into_domain(self) -> Result<KycStatusChange, DatabaseError> {
        Ok(KycStatusChange {
            status: self
                .status
                .parse()
                .map_err(|e| DatabaseError::decode("status", e))?,
            changed_by: self.changed_by.map(AgentId::from),
            reason: self.reason,
            changed_at: self.changed_at,
        })
    }
}
