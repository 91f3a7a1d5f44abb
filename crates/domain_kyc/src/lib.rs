//! KYC Verification Domain
//!
//! This crate implements the identity-verification case lifecycle from
//! submission through automated screening and reviewer decision.
//!
//! # Case Lifecycle
//!
//! ```text
//! Pending -> Review -> Approved | Rejected
//! ```
//!
//! Every rejection carries a reviewer identity and a reason; approved and
//! rejected cases are terminal.

pub mod case;
pub mod screening;
pub mod decision;
pub mod events;
pub mod ports;
pub mod error;

pub use case::{KycCase, KycStatus, DocumentKind, RiskScore};
pub use screening::{ScreeningOutcome, ScreeningCheck, CheckResult, screen};
pub use decision::ReviewDecision;
pub use events::KycEvent;
pub use ports::{KycCasePort, KycCaseQuery, KycStatusChange};
pub use error::KycError;
