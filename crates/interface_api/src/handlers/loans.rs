//! Loan/EMI handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, CustomerId, LoanId, Money, Rate};
use domain_lending::{EmiSchedule, LoanEvent, PaymentChannel, ScheduleQuery, ScheduleStatus};

use crate::dto::loans::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates the EMI schedule at loan disbursal
pub async fn disburse(
    State(state): State<AppState>,
    Json(request): Json<DisburseRequest>,
) -> Result<(StatusCode, Json<ScheduleResponse>), ApiError> {
    request.validate()?;

    let currency: Currency = request
        .currency
        .parse()
        .map_err(|e: core_kernel::MoneyError| ApiError::BadRequest(e.to_string()))?;

    let schedule = EmiSchedule::disburse(
        CustomerId::from(request.customer_id),
        Money::new(request.principal, currency),
        Rate::from_percentage(request.annual_rate_percent),
        request.total_installments,
        request.disbursed_on,
        request.auto_debit,
    )?;

    state.loans.insert_schedule(&schedule, None).await?;

    state.hub.publish(LoanEvent::ScheduleCreated {
        loan_id: schedule.id,
        customer_id: schedule.customer_id,
        principal: schedule.principal,
        installment_amount: schedule.installment_amount,
        total_installments: schedule.total_installments,
        timestamp: Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(ScheduleResponse::from(&schedule))))
}

/// Lists schedules with optional filters
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(params): Query<ListSchedulesQuery>,
) -> Result<Json<Vec<ScheduleResponse>>, ApiError> {
    let query = ScheduleQuery {
        status: params
            .status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(ApiError::BadRequest)?,
        customer_id: params.customer_id.map(CustomerId::from),
        auto_debit: params.auto_debit,
        due_on_or_before: params.due_on_or_before,
        limit: params.limit,
        offset: params.offset,
    };

    let schedules = state.loans.find_schedules(query, None).await?;
    Ok(Json(schedules.iter().map(ScheduleResponse::from).collect()))
}

/// Gets a schedule by ID, including recorded payments
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let schedule = state.loans.get_schedule(LoanId::from(id), None).await?;
    Ok(Json(ScheduleResponse::from(&schedule)))
}

/// Records one installment payment
pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<ScheduleResponse>), ApiError> {
    request.validate()?;
    let channel: PaymentChannel = request.channel.parse().map_err(ApiError::BadRequest)?;

    let mut schedule = state.loans.get_schedule(LoanId::from(id), None).await?;
    let payment = schedule.record_payment(channel)?.clone();
    state.loans.update_schedule(&schedule, None).await?;

    state.hub.publish(LoanEvent::InstallmentPaid {
        loan_id: schedule.id,
        sequence: payment.sequence,
        amount: payment.amount,
        channel: payment.channel,
        next_due_date: schedule.next_due_date,
        timestamp: Utc::now(),
    });

    if schedule.status == ScheduleStatus::Completed {
        state.hub.publish(LoanEvent::ScheduleCompleted {
            loan_id: schedule.id,
            customer_id: schedule.customer_id,
            timestamp: Utc::now(),
        });
    }

    Ok((StatusCode::CREATED, Json(ScheduleResponse::from(&schedule))))
}

/// Toggles the auto-debit mandate
pub async fn set_auto_debit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AutoDebitRequest>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let mut schedule = state.loans.get_schedule(LoanId::from(id), None).await?;
    schedule.set_auto_debit(request.enabled)?;
    state.loans.update_schedule(&schedule, None).await?;

    state.hub.publish(LoanEvent::AutoDebitChanged {
        loan_id: schedule.id,
        enabled: request.enabled,
        timestamp: Utc::now(),
    });

    Ok(Json(ScheduleResponse::from(&schedule)))
}
