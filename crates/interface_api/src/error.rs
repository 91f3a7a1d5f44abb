//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_kyc::KycError;
use domain_lending::LendingError;
use domain_tickets::TicketError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone()),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone()),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { .. } => ApiError::Validation(err.to_string()),
            PortError::InvalidTransition { .. } | PortError::Conflict { .. } => {
                ApiError::Conflict(err.to_string())
            }
            PortError::Connection { .. } | PortError::Timeout { .. } => {
                ApiError::Unavailable(err.to_string())
            }
            PortError::Internal { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<KycError> for ApiError {
    fn from(err: KycError) -> Self {
        match err {
            KycError::CaseNotFound(_) => ApiError::NotFound(err.to_string()),
            KycError::InvalidStatusTransition { .. }
            | KycError::CaseTerminal
            | KycError::NotInReview(_) => ApiError::Conflict(err.to_string()),
            KycError::RejectionReasonRequired | KycError::InvalidDocument(_) => {
                ApiError::Validation(err.to_string())
            }
        }
    }
}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::TicketNotFound(_) => ApiError::NotFound(err.to_string()),
            TicketError::InvalidStatusTransition { .. }
            | TicketError::TicketResolved
            | TicketError::AlreadyEscalated => ApiError::Conflict(err.to_string()),
            TicketError::EmptyComment => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<LendingError> for ApiError {
    fn from(err: LendingError) -> Self {
        match err {
            LendingError::ScheduleNotFound(_) => ApiError::NotFound(err.to_string()),
            LendingError::ScheduleCompleted | LendingError::AutoDebitOnCompleted => {
                ApiError::Conflict(err.to_string())
            }
            LendingError::InvalidTerms(_) => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
