//! Loan/EMI DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_lending::{EmiSchedule, InstallmentPayment};

#[derive(Debug, Deserialize, Validate)]
pub struct DisburseRequest {
    pub customer_id: Uuid,
    pub principal: Decimal,
    /// ISO 4217 code, e.g. "INR"
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    /// Nominal annual rate as a percentage, e.g. 10.5
    pub annual_rate_percent: Decimal,
    #[validate(range(min = 1, max = 480))]
    pub total_installments: u32,
    pub disbursed_on: NaiveDate,
    #[serde(default)]
    pub auto_debit: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    /// "auto_debit" or "manual"
    #[validate(length(min = 1))]
    pub channel: String,
}

#[derive(Debug, Deserialize)]
pub struct AutoDebitRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListSchedulesQuery {
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
    pub auto_debit: Option<bool>,
    pub due_on_or_before: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub loan_number: String,
    pub customer_id: Uuid,
    pub principal: Decimal,
    pub currency: String,
    pub annual_rate_percent: Decimal,
    pub installment_amount: Decimal,
    pub paid_installments: u32,
    pub total_installments: u32,
    pub next_due_date: Option<NaiveDate>,
    pub auto_debit: bool,
    pub status: String,
    pub payments: Vec<PaymentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&EmiSchedule> for ScheduleResponse {
    fn from(schedule: &EmiSchedule) -> Self {
        Self {
            id: *schedule.id.as_uuid(),
            loan_number: schedule.loan_number.clone(),
            customer_id: *schedule.customer_id.as_uuid(),
            principal: schedule.principal.amount(),
            currency: schedule.principal.currency().code().to_string(),
            annual_rate_percent: schedule.annual_rate.as_percentage(),
            installment_amount: schedule.installment_amount.amount(),
            paid_installments: schedule.paid_installments,
            total_installments: schedule.total_installments,
            next_due_date: schedule.next_due_date,
            auto_debit: schedule.auto_debit,
            status: schedule.status.as_str().to_string(),
            payments: schedule.payments.iter().map(PaymentResponse::from).collect(),
            created_at: schedule.created_at,
            updated_at: schedule.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub sequence: u32,
    pub amount: Decimal,
    pub channel: String,
    pub paid_at: DateTime<Utc>,
}

impl From<&InstallmentPayment> for PaymentResponse {
    fn from(payment: &InstallmentPayment) -> Self {
        Self {
            sequence: payment.sequence,
            amount: payment.amount.amount(),
            channel: payment.channel.as_str().to_string(),
            paid_at: payment.paid_at,
        }
    }
}
