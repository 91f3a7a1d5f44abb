//! PostgreSQL Work Queue Adapter
//!
//! Implements `WorkQueuePort` over the work_items table. `claim_next` takes
//! the head row with FOR UPDATE SKIP LOCKED so concurrent agents cannot
//! claim the same item.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{
    AgentId, WorkItemId, PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult,
};
use domain_workflow::{WorkItem, WorkQueuePort, WorkQueueQuery};

use crate::error::DatabaseError;

/// PostgreSQL-backed implementation of the WorkQueuePort trait
#[derive(Debug, Clone)]
pub struct PostgresWorkQueueAdapter {
    pool: PgPool,
}

impl PostgresWorkQueueAdapter {
    /// Creates a new PostgreSQL work queue adapter
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresWorkQueueAdapter {}

#[async_trait]
impl HealthCheckable for PostgresWorkQueueAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::pool_health(&self.pool, "postgres-workqueue").await
    }
}

const ITEM_COLUMNS: &str =
    "item_id, kind, case_id, priority, enqueued_at, claimed_by, claimed_at";

/// Pickup ordering: priority descending, oldest first within a band
const PICKUP_ORDER: &str = "ORDER BY (claimed_by IS NOT NULL) ASC, \
     CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END ASC, \
     enqueued_at ASC";

#[async_trait]
impl WorkQueuePort for PostgresWorkQueueAdapter {
    async fn get_item(
        &self,
        id: WorkItemId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<WorkItem, PortError> {
        let sql = format!("SELECT {} FROM work_items WHERE item_id = $1", ITEM_COLUMNS);
        let row: Option<WorkItemRow> = sqlx::query_as(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        row.ok_or_else(|| PortError::not_found("WorkItem", id))?
            .into_domain()
            .map_err(PortError::from)
    }

    async fn list_items(
        &self,
        query: WorkQueueQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<WorkItem>, PortError> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM work_items WHERE 1=1", ITEM_COLUMNS));

        if let Some(kind) = query.kind {
            qb.push(" AND kind = ").push_bind(kind.as_str());
        }
        if let Some(priority) = query.priority {
            qb.push(" AND priority = ").push_bind(priority.as_str());
        }
        if let Some(claimed) = query.claimed {
            qb.push(if claimed {
                " AND claimed_by IS NOT NULL"
            } else {
                " AND claimed_by IS NULL"
            });
        }
        qb.push(" ");
        qb.push(PICKUP_ORDER);
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows: Vec<WorkItemRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        rows.into_iter()
            .map(|r| r.into_domain().map_err(PortError::from))
            .collect()
    }

    #[instrument(skip(self, item, _metadata), fields(item_id = %item.id, kind = item.kind.as_str()))]
    async fn enqueue(
        &self,
        item: &WorkItem,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO work_items (item_id, kind, case_id, priority, enqueued_at, claimed_by, claimed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::from(item.id))
        .bind(item.kind.as_str())
        .bind(item.case_id)
        .bind(item.priority.as_str())
        .bind(item.enqueued_at)
        .bind(item.claimed_by.map(Uuid::from))
        .bind(item.claimed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::from(DatabaseError::from(&e)))?;
        Ok(())
    }

    #[instrument(skip(self, _metadata), fields(agent = %agent))]
    async fn claim_next(
        &self,
        agent: AgentId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Option<WorkItem>, PortError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        let sql = format!(
            "SELECT {} FROM work_items WHERE claimed_by IS NULL \
             {} LIMIT 1 FOR UPDATE SKIP LOCKED",
            ITEM_COLUMNS, PICKUP_ORDER
        );
        let head: Option<WorkItemRow> = sqlx::query_as(&sql)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        let Some(row) = head else {
            return Ok(None);
        };

        let claimed_at = Utc::now();
        sqlx::query("UPDATE work_items SET claimed_by = $2, claimed_at = $3 WHERE item_id = $1")
            .bind(row.item_id)
            .bind(Uuid::from(agent))
            .bind(claimed_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        tx.commit()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        let mut item = row.into_domain().map_err(PortError::from)?;
        item.claimed_by = Some(agent);
        item.claimed_at = Some(claimed_at);
        Ok(Some(item))
    }

    async fn release(
        &self,
        id: WorkItemId,
        agent: AgentId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<WorkItem, PortError> {
        let sql = format!(
            "UPDATE work_items SET claimed_by = NULL, claimed_at = NULL \
             WHERE item_id = $1 AND claimed_by = $2 RETURNING {}",
            ITEM_COLUMNS
        );
        let row: Option<WorkItemRow> = sqlx::query_as(&sql)
            .bind(Uuid::from(id))
            .bind(Uuid::from(agent))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        match row {
            Some(row) => row.into_domain().map_err(PortError::from),
            // Either the item does not exist or the caller is not the holder
            None => {
                let exists = self.get_item(id, None).await.is_ok();
                if exists {
                    Err(PortError::conflict("work item claimed by a different agent"))
                } else {
                    Err(PortError::not_found("WorkItem", id))
                }
            }
        }
    }

    async fn complete(
        &self,
        id: WorkItemId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        let deleted = sqlx::query("DELETE FROM work_items WHERE item_id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;

        if deleted.rows_affected() == 0 {
            return Err(PortError::not_found("WorkItem", id));
        }
        Ok(())
    }

    async fn complete_for_case(
        &self,
        case_id: Uuid,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        sqlx::query("DELETE FROM work_items WHERE case_id = $1")
            .bind(case_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::from(DatabaseError::from(&e)))?;
        Ok(())
    }
}

/// Database row for a work item
#[derive(Debug, Clone, sqlx::FromRow)]
struct WorkItemRow {
    item_id: Uuid,
    kind: String,
    case_id: Uuid,
    priority: String,
    enqueued_at: DateTime<Utc>,
    claimed_by: Option<Uuid>,
    claimed_at: Option<DateTime<Utc>>,
}

impl WorkItemRow {
    fn into_domain(self) -> Result<WorkItem, DatabaseError> {
        Ok(WorkItem {
            id: WorkItemId::from(self.item_id),
            kind: self
                .kind
                .parse()
                .map_err(|e| DatabaseError::decode("kind", e))?,
            case_id: self.case_id,
            priority: self
                .priority
                .parse()
                .map_err(|e| DatabaseError::decode("priority", e))?,
            enqueued_at: self.enqueued_at,
            claimed_by: self.claimed_by.map(AgentId::from),
            claimed_at: self.claimed_at,
        })
    }
}
