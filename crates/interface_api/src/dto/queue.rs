//! Work queue DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_workflow::WorkItem;

#[derive(Debug, Deserialize, Default)]
pub struct ListQueueQuery {
    pub kind: Option<String>,
    pub priority: Option<String>,
    pub claimed: Option<bool>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct WorkItemResponse {
    pub id: Uuid,
    pub kind: String,
    pub case_id: Uuid,
    pub priority: String,
    pub enqueued_at: DateTime<Utc>,
    pub claimed_by: Option<Uuid>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl From<&WorkItem> for WorkItemResponse {
    fn from(item: &WorkItem) -> Self {
        Self {
            id: *item.id.as_uuid(),
            kind: item.kind.as_str().to_string(),
            case_id: item.case_id,
            priority: item.priority.as_str().to_string(),
            enqueued_at: item.enqueued_at,
            claimed_by: item.claimed_by.map(|a| *a.as_uuid()),
            claimed_at: item.claimed_at,
        }
    }
}

/// Response for a claim attempt; item is None when the queue is empty
#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub item: Option<WorkItemResponse>,
}
