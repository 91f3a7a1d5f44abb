//! Work queue handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::WorkItemId;
use domain_workflow::WorkQueueQuery;

use crate::auth::{has_role, permissions, Claims};
use crate::dto::queue::*;
use crate::error::ApiError;
use crate::AppState;

/// Lists queue entries in pickup order
pub async fn list_queue(
    State(state): State<AppState>,
    Query(params): Query<ListQueueQuery>,
) -> Result<Json<Vec<WorkItemResponse>>, ApiError> {
    let query = WorkQueueQuery {
        kind: params
            .kind
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        priority: params
            .priority
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        claimed: params.claimed,
        limit: params.limit,
    };

    let items = state.queue.list_items(query, None).await?;
    Ok(Json(items.iter().map(WorkItemResponse::from).collect()))
}

/// Claims the highest-ranked unclaimed item for the calling agent
pub async fn claim_next(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ClaimResponse>, ApiError> {
    if !has_role(&claims, permissions::QUEUE_CLAIM) {
        return Err(ApiError::Forbidden(
            "queue:claim permission required".to_string(),
        ));
    }
    let agent = claims
        .agent_id()
        .map_err(|_| ApiError::BadRequest("token subject is not an agent id".to_string()))?;

    let item = state.queue.claim_next(agent, None).await?;
    Ok(Json(ClaimResponse {
        item: item.as_ref().map(WorkItemResponse::from),
    }))
}

/// Releases a claim held by the calling agent
pub async fn release(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkItemResponse>, ApiError> {
    let agent = claims
        .agent_id()
        .map_err(|_| ApiError::BadRequest("token subject is not an agent id".to_string()))?;

    let item = state
        .queue
        .release(WorkItemId::from(id), agent, None)
        .await?;
    Ok(Json(WorkItemResponse::from(&item)))
}
