//! Core Kernel - Foundational types and utilities for the banking back office
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Temporal types for due-date and SLA deadline handling
//! - Common identifiers and value objects
//! - Port abstractions shared by every data-source adapter

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, Rate, MoneyError};
pub use temporal::{ValidPeriod, Timezone, TemporalError, add_months_clamped};
pub use identifiers::{
    KycCaseId, TicketId, LoanId, CustomerId, AgentId,
    DocumentId, CommentId, WorkItemId, EventId,
};
pub use ports::{
    PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult, AdapterHealth,
};
pub use error::CoreError;
