//! The agent work queue
//!
//! Pending KYC cases and tickets share one queue. Ordering is priority
//! descending, then enqueue time ascending, so a High ticket outranks a
//! Medium case and nothing starves within a band.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AgentId, WorkItemId};

use crate::error::WorkflowError;

/// The kind of case behind a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    Kyc,
    Ticket,
}

impl WorkItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemKind::Kyc => "kyc",
            WorkItemKind::Ticket => "ticket",
        }
    }
}

impl std::str::FromStr for WorkItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kyc" => Ok(WorkItemKind::Kyc),
            "ticket" => Ok(WorkItemKind::Ticket),
            other => Err(format!("unknown work item kind: {}", other)),
        }
    }
}

/// Priority on the shared queue scale
///
/// KYC risk scores and ticket priorities both map onto this scale; the kind
/// is deliberately not an ordering key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkPriority {
    Low,
    Medium,
    High,
}

impl WorkPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkPriority::Low => "low",
            WorkPriority::Medium => "medium",
            WorkPriority::High => "high",
        }
    }
}

impl std::str::FromStr for WorkPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(WorkPriority::Low),
            "medium" => Ok(WorkPriority::Medium),
            "high" => Ok(WorkPriority::High),
            other => Err(format!("unknown work priority: {}", other)),
        }
    }
}

/// One entry on the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique identifier
    pub id: WorkItemId,
    /// Case kind
    pub kind: WorkItemKind,
    /// The underlying case's UUID (KycCaseId or TicketId)
    pub case_id: Uuid,
    /// Queue priority
    pub priority: WorkPriority,
    /// When the item entered the queue
    pub enqueued_at: DateTime<Utc>,
    /// Agent holding the claim, if any
    pub claimed_by: Option<AgentId>,
    /// When the claim was taken
    pub claimed_at: Option<DateTime<Utc>>,
}

impl WorkItem {
    /// Creates an unclaimed item
    pub fn new(kind: WorkItemKind, case_id: Uuid, priority: WorkPriority) -> Self {
        Self {
            id: WorkItemId::new_v7(),
            kind,
            case_id,
            priority,
            enqueued_at: Utc::now(),
            claimed_by: None,
            claimed_at: None,
        }
    }

    /// Returns true if an agent currently holds this item
    pub fn is_claimed(&self) -> bool {
        self.claimed_by.is_some()
    }

    /// Claims the item for an agent
    ///
    /// A claimed item stays claimed until released or completed; a second
    /// claim by any agent (including the holder) is rejected.
    pub fn claim(&mut self, agent: AgentId) -> Result<(), WorkflowError> {
        if let Some(holder) = self.claimed_by {
            return Err(WorkflowError::AlreadyClaimed(holder.to_string()));
        }
        self.claimed_by = Some(agent);
        self.claimed_at = Some(Utc::now());
        Ok(())
    }

    /// Releases a claim held by the given agent
    pub fn release(&mut self, agent: AgentId) -> Result<(), WorkflowError> {
        match self.claimed_by {
            None => Err(WorkflowError::NotClaimed),
            Some(holder) if holder != agent => Err(WorkflowError::ClaimedByOther),
            Some(_) => {
                self.claimed_by = None;
                self.claimed_at = None;
                Ok(())
            }
        }
    }
}

/// Sorts items into pickup order: priority descending, oldest first within a
/// band. Claimed items sort after unclaimed ones so the head of the list is
/// always actionable.
pub fn order_for_pickup(items: &mut [WorkItem]) {
    items.sort_by(|a, b| {
        a.is_claimed()
            .cmp(&b.is_claimed())
            .then(b.priority.cmp(&a.priority))
            .then(a.enqueued_at.cmp(&b.enqueued_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(priority: WorkPriority, age_minutes: i64) -> WorkItem {
        let mut item = WorkItem::new(WorkItemKind::Ticket, Uuid::new_v4(), priority);
        item.enqueued_at = Utc::now() - Duration::minutes(age_minutes);
        item
    }

    #[test]
    fn test_priority_orders_first() {
        let mut items = vec![
            item(WorkPriority::Low, 120),
            item(WorkPriority::High, 1),
            item(WorkPriority::Medium, 60),
        ];
        order_for_pickup(&mut items);

        let priorities: Vec<_> = items.iter().map(|i| i.priority).collect();
        assert_eq!(
            priorities,
            vec![WorkPriority::High, WorkPriority::Medium, WorkPriority::Low]
        );
    }

    #[test]
    fn test_age_breaks_ties() {
        let older = item(WorkPriority::Medium, 90);
        let newer = item(WorkPriority::Medium, 10);
        let older_id = older.id;

        let mut items = vec![newer, older];
        order_for_pickup(&mut items);

        assert_eq!(items[0].id, older_id);
    }

    #[test]
    fn test_claimed_items_sink() {
        let mut claimed = item(WorkPriority::High, 60);
        claimed.claim(AgentId::new_v7()).unwrap();
        let unclaimed = item(WorkPriority::Low, 5);
        let unclaimed_id = unclaimed.id;

        let mut items = vec![claimed, unclaimed];
        order_for_pickup(&mut items);

        assert_eq!(items[0].id, unclaimed_id);
    }

    #[test]
    fn test_claim_is_exclusive() {
        let mut item = item(WorkPriority::High, 0);
        let first = AgentId::new_v7();
        let second = AgentId::new_v7();

        item.claim(first).unwrap();
        assert!(matches!(
            item.claim(second),
            Err(WorkflowError::AlreadyClaimed(_))
        ));
    }

    #[test]
    fn test_release_requires_holder() {
        let mut item = item(WorkPriority::High, 0);
        let holder = AgentId::new_v7();
        let other = AgentId::new_v7();

        assert!(matches!(item.release(holder), Err(WorkflowError::NotClaimed)));

        item.claim(holder).unwrap();
        assert!(matches!(item.release(other), Err(WorkflowError::ClaimedByOther)));

        item.release(holder).unwrap();
        assert!(!item.is_claimed());

        // Released items can be claimed again
        assert!(item.claim(other).is_ok());
    }
}
