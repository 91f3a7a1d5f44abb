//! PostgreSQL adapters implementing the domain ports
//!
//! Each adapter owns a pool handle, translates rows to aggregates, and maps
//! database errors into the port vocabulary.

pub mod kyc;
pub mod tickets;
pub mod lending;
pub mod workqueue;

pub use kyc::PostgresKycAdapter;
pub use tickets::PostgresTicketAdapter;
pub use lending::PostgresLendingAdapter;
pub use workqueue::PostgresWorkQueueAdapter;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Runs the standard connectivity probe for an adapter
pub(crate) async fn pool_health(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(e.to_string()),
            checked_at: Utc::now(),
        },
    }
}
