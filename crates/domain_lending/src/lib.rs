//! Lending Domain
//!
//! This crate implements EMI (Equated Monthly Installment) tracking from loan
//! disbursal through the final installment.
//!
//! # Schedule Lifecycle
//!
//! ```text
//! Active -> Completed        (when paid count reaches total)
//! ```
//!
//! The paid installment count can never exceed the total; completion is
//! terminal.

pub mod schedule;
pub mod amortization;
pub mod events;
pub mod ports;
pub mod error;

pub use schedule::{EmiSchedule, ScheduleStatus, InstallmentPayment, PaymentChannel};
pub use amortization::{emi_amount, total_interest, outstanding_principal};
pub use events::LoanEvent;
pub use ports::{EmiSchedulePort, ScheduleQuery};
pub use error::LendingError;
