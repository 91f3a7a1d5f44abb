//! Customer Support Domain
//!
//! This crate implements the support-ticket lifecycle from first contact
//! through agent handling, escalation, and resolution.
//!
//! # Ticket Lifecycle
//!
//! ```text
//! Open -> InProgress <-> Pending
//!   \         |
//!    \        v
//!     `--> Resolved
//! ```
//!
//! `Pending` means waiting on the customer; `Resolved` is terminal.

pub mod ticket;
pub mod sla;
pub mod events;
pub mod ports;
pub mod error;

pub use ticket::{Ticket, TicketStatus, TicketPriority, TicketComment};
pub use sla::{SlaPolicy, SlaDeadlines, SlaState};
pub use events::TicketEvent;
pub use ports::{TicketPort, TicketQuery};
pub use error::TicketError;
