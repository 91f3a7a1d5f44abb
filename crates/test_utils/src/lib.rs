//! Shared Test Utilities
//!
//! Builders, fixtures, and generators used across the workspace test suites.
//! Tests specify only the fields they care about and take defaults for the
//! rest.

pub mod fixtures;
pub mod builders;
pub mod generators;
pub mod assertions;

pub use builders::{TestKycCaseBuilder, TestTicketBuilder, TestEmiScheduleBuilder};
pub use fixtures::{MoneyFixtures, DocumentFixtures, TemporalFixtures};
