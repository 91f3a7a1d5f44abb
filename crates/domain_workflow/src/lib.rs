//! Cross-Case Workflow Domain
//!
//! Two concerns that sit above the individual case aggregates:
//!
//! - the **work queue**, which orders pending KYC cases and tickets for agent
//!   pickup (priority first, oldest first within a band), with claim/release
//!   semantics so two agents never work the same item;
//! - the **notification hub**, which fans out typed case events to downstream
//!   consumers whenever a status changes.

pub mod queue;
pub mod notify;
pub mod ports;
pub mod error;

pub use queue::{WorkItem, WorkItemKind, WorkPriority, order_for_pickup};
pub use notify::{CaseEvent, CasePayload, NotificationHub, NotificationSink, TracingSink};
pub use ports::{WorkQueuePort, WorkQueueQuery};
pub use error::WorkflowError;
