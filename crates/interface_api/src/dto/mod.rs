//! Request/Response data transfer objects

pub mod kyc;
pub mod tickets;
pub mod loans;
pub mod queue;
