//! SLA policies and deadline tracking
//!
//! Each priority carries a first-response window and a resolution window.
//! Deadlines are recomputed when a ticket is escalated, keeping the original
//! open time as the anchor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::temporal::deadline_after_hours;

use crate::ticket::TicketPriority;

/// Response and resolution windows for one priority band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaPolicy {
    pub priority: TicketPriority,
    pub first_response_hours: u32,
    pub resolution_hours: u32,
}

impl SlaPolicy {
    /// The bank's standard support SLA matrix
    pub fn standard(priority: TicketPriority) -> Self {
        match priority {
            TicketPriority::High => Self {
                priority,
                first_response_hours: 1,
                resolution_hours: 8,
            },
            TicketPriority::Medium => Self {
                priority,
                first_response_hours: 4,
                resolution_hours: 24,
            },
            TicketPriority::Low => Self {
                priority,
                first_response_hours: 8,
                resolution_hours: 72,
            },
        }
    }

    /// Computes the deadlines for a ticket opened at the given instant
    pub fn deadlines(&self, opened_at: DateTime<Utc>) -> SlaDeadlines {
        SlaDeadlines {
            first_response_due: deadline_after_hours(opened_at, self.first_response_hours),
            resolution_due: deadline_after_hours(opened_at, self.resolution_hours),
        }
    }
}

/// Concrete deadlines derived from a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaDeadlines {
    pub first_response_due: DateTime<Utc>,
    pub resolution_due: DateTime<Utc>,
}

/// SLA standing of a ticket at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaState {
    OnTrack,
    FirstResponseBreached,
    ResolutionBreached,
}

impl SlaDeadlines {
    /// Evaluates the SLA standing given what has happened so far
    pub fn state(
        &self,
        now: DateTime<Utc>,
        first_response_at: Option<DateTime<Utc>>,
        resolved_at: Option<DateTime<Utc>>,
    ) -> SlaState {
        let resolution_met = match resolved_at {
            Some(at) => at <= self.resolution_due,
            None => now <= self.resolution_due,
        };
        if !resolution_met {
            return SlaState::ResolutionBreached;
        }

        let first_response_met = match first_response_at {
            Some(at) => at <= self.first_response_due,
            None => now <= self.first_response_due,
        };
        if !first_response_met {
            return SlaState::FirstResponseBreached;
        }

        SlaState::OnTrack
    }
}
