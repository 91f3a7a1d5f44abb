//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL side of the case store, implementing
//! each domain's port trait over a SQLx connection pool.
//!
//! # Architecture
//!
//! Adapters translate between domain aggregates and database rows, and map
//! database errors to `PortError`. Queries are runtime-checked; enum columns
//! are stored as text and converted at the boundary through the domain
//! enums' `FromStr`/`as_str` pairs, so the workspace builds without a live
//! database.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, PostgresKycAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/banking")).await?;
//! let kyc: Arc<dyn KycCasePort> = Arc::new(PostgresKycAdapter::new(pool));
//! ```

pub mod pool;
pub mod error;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::{
    PostgresKycAdapter, PostgresTicketAdapter, PostgresLendingAdapter,
    PostgresWorkQueueAdapter,
};
