//! Domain events for the EMI schedule aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, LoanId, Money};

use crate::schedule::PaymentChannel;

/// Domain events emitted by the EMI schedule aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanEvent {
    /// A schedule was created at disbursal
    ScheduleCreated {
        loan_id: LoanId,
        customer_id: CustomerId,
        principal: Money,
        installment_amount: Money,
        total_installments: u32,
        timestamp: DateTime<Utc>,
    },

    /// One installment was collected
    InstallmentPaid {
        loan_id: LoanId,
        sequence: u32,
        amount: Money,
        channel: PaymentChannel,
        next_due_date: Option<NaiveDate>,
        timestamp: DateTime<Utc>,
    },

    /// The auto-debit mandate was toggled
    AutoDebitChanged {
        loan_id: LoanId,
        enabled: bool,
        timestamp: DateTime<Utc>,
    },

    /// The final installment was collected
    ScheduleCompleted {
        loan_id: LoanId,
        customer_id: CustomerId,
        timestamp: DateTime<Utc>,
    },
}

impl LoanEvent {
    /// Returns the loan the event belongs to
    pub fn loan_id(&self) -> LoanId {
        match self {
            LoanEvent::ScheduleCreated { loan_id, .. }
            | LoanEvent::InstallmentPaid { loan_id, .. }
            | LoanEvent::AutoDebitChanged { loan_id, .. }
            | LoanEvent::ScheduleCompleted { loan_id, .. } => *loan_id,
        }
    }
}
