//! KYC handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{CustomerId, KycCaseId};
use domain_kyc::{
    screen, DocumentKind, KycCase, KycCaseQuery, KycEvent, ReviewDecision,
};
use domain_workflow::{WorkItem, WorkItemKind};

use crate::auth::{has_role, permissions, Claims};
use crate::dto::kyc::*;
use crate::error::ApiError;
use crate::handlers::risk_priority;
use crate::AppState;

/// Submits a new case; screening runs inline and the case joins the queue
pub async fn submit_case(
    State(state): State<AppState>,
    Json(request): Json<SubmitCaseRequest>,
) -> Result<(StatusCode, Json<KycCaseResponse>), ApiError> {
    request.validate()?;

    let kind = DocumentKind::parse(&request.document_kind);
    let screening = screen(
        &kind,
        &request.document_number,
        request.document_expiry,
        Utc::now().date_naive(),
    );

    let case = KycCase::submit(
        CustomerId::from(request.customer_id),
        kind,
        request.document_number,
        request.document_expiry,
        screening.clone(),
    );

    state.kyc.insert_case(&case, None).await?;

    let item = WorkItem::new(
        WorkItemKind::Kyc,
        *case.id.as_uuid(),
        risk_priority(case.risk_score),
    );
    state.queue.enqueue(&item, None).await?;

    state.hub.publish(KycEvent::CaseSubmitted {
        case_id: case.id,
        customer_id: case.customer_id,
        risk_score: case.risk_score,
        timestamp: Utc::now(),
    });
    state.hub.publish(KycEvent::ScreeningCompleted {
        case_id: case.id,
        risk_score: screening.risk_score,
        all_passed: screening.all_passed(),
        timestamp: Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(KycCaseResponse::from(&case))))
}

/// Lists cases with optional filters
pub async fn list_cases(
    State(state): State<AppState>,
    Query(params): Query<ListCasesQuery>,
) -> Result<Json<Vec<KycCaseResponse>>, ApiError> {
    let query = KycCaseQuery {
        status: params
            .status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        risk_score: params
            .risk_score
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        customer_id: params.customer_id.map(CustomerId::from),
        assigned_to: None,
        limit: params.limit,
        offset: params.offset,
    };

    let cases = state.kyc.find_cases(query, None).await?;
    Ok(Json(cases.iter().map(KycCaseResponse::from).collect()))
}

/// Gets a case by ID
pub async fn get_case(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<KycCaseResponse>, ApiError> {
    let case = state.kyc.get_case(KycCaseId::from(id), None).await?;
    Ok(Json(KycCaseResponse::from(&case)))
}

/// Returns the status history for a case, oldest first
pub async fn case_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StatusChangeResponse>>, ApiError> {
    let history = state.kyc.status_history(KycCaseId::from(id), None).await?;
    Ok(Json(history.iter().map(StatusChangeResponse::from).collect()))
}

/// Moves a pending case into review, assigned to the calling agent
pub async fn start_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<KycCaseResponse>, ApiError> {
    let reviewer = claims
        .agent_id()
        .map_err(|_| ApiError::BadRequest("token subject is not an agent id".to_string()))?;

    let mut case = state.kyc.get_case(KycCaseId::from(id), None).await?;
    case.start_review(reviewer)?;
    state
        .kyc
        .persist_transition(&case, Some(reviewer), None, None)
        .await?;

    state.hub.publish(KycEvent::ReviewStarted {
        case_id: case.id,
        reviewer,
        timestamp: Utc::now(),
    });

    Ok(Json(KycCaseResponse::from(&case)))
}

/// Applies a terminal decision to a case in review
///
/// Requires the kyc:decide permission. A rejection without a reason is
/// refused before anything is persisted.
pub async fn decide(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<KycCaseResponse>, ApiError> {
    if !has_role(&claims, permissions::KYC_DECIDE) {
        return Err(ApiError::Forbidden(
            "kyc:decide permission required".to_string(),
        ));
    }
    request.validate()?;

    let reviewer = claims
        .agent_id()
        .map_err(|_| ApiError::BadRequest("token subject is not an agent id".to_string()))?;

    let decision = match request.decision.as_str() {
        "approve" => ReviewDecision::approve(reviewer),
        "reject" => ReviewDecision::reject(reviewer, request.reason.unwrap_or_default()),
        other => {
            return Err(ApiError::BadRequest(format!(
                "unknown decision '{}', expected approve or reject",
                other
            )))
        }
    };

    let mut case = state.kyc.get_case(KycCaseId::from(id), None).await?;
    case.decide(decision)?;
    state
        .kyc
        .persist_transition(&case, Some(reviewer), case.rejection_reason.as_deref(), None)
        .await?;

    // Terminal cases leave the agent queue
    state.queue.complete_for_case(*case.id.as_uuid(), None).await?;

    let event = match case.rejection_reason.as_ref() {
        None => KycEvent::CaseApproved {
            case_id: case.id,
            customer_id: case.customer_id,
            reviewer,
            timestamp: Utc::now(),
        },
        Some(reason) => KycEvent::CaseRejected {
            case_id: case.id,
            customer_id: case.customer_id,
            reviewer,
            reason: reason.clone(),
            timestamp: Utc::now(),
        },
    };
    state.hub.publish(event);

    Ok(Json(KycCaseResponse::from(&case)))
}
