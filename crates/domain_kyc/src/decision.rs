//! Reviewer decisions

use serde::{Deserialize, Serialize};

use core_kernel::AgentId;

/// A terminal decision made by a reviewer on a case in Review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve {
        reviewer: AgentId,
    },
    Reject {
        reviewer: AgentId,
        reason: String,
    },
}

impl ReviewDecision {
    /// Creates an approval
    pub fn approve(reviewer: AgentId) -> Self {
        ReviewDecision::Approve { reviewer }
    }

    /// Creates a rejection with the mandatory reason
    pub fn reject(reviewer: AgentId, reason: impl Into<String>) -> Self {
        ReviewDecision::Reject {
            reviewer,
            reason: reason.into(),
        }
    }
}
