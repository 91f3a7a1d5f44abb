//! EMI schedule aggregate

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{temporal::add_months_clamped, CustomerId, LoanId, Money, Rate};

use crate::amortization::emi_amount;
use crate::error::LendingError;

/// Schedule status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Installments remain
    Active,
    /// Every installment has been paid
    Completed,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Active => "active",
            ScheduleStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ScheduleStatus::Active),
            "completed" => Ok(ScheduleStatus::Completed),
            other => Err(format!("unknown schedule status: {}", other)),
        }
    }
}

/// How an installment was collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentChannel {
    AutoDebit,
    Manual,
}

impl PaymentChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentChannel::AutoDebit => "auto_debit",
            PaymentChannel::Manual => "manual",
        }
    }
}

impl std::str::FromStr for PaymentChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto_debit" => Ok(PaymentChannel::AutoDebit),
            "manual" => Ok(PaymentChannel::Manual),
            other => Err(format!("unknown payment channel: {}", other)),
        }
    }
}

/// A recorded installment payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentPayment {
    /// 1-based installment sequence number
    pub sequence: u32,
    pub amount: Money,
    pub channel: PaymentChannel,
    pub paid_at: DateTime<Utc>,
}

/// The repayment schedule for a disbursed loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiSchedule {
    /// Unique identifier
    pub id: LoanId,
    /// Loan account number (human-readable)
    pub loan_number: String,
    /// Borrower
    pub customer_id: CustomerId,
    /// Disbursed principal
    pub principal: Money,
    /// Nominal annual interest rate
    pub annual_rate: Rate,
    /// Fixed monthly installment
    pub installment_amount: Money,
    /// Installments paid so far
    pub paid_installments: u32,
    /// Total installments in the tenor
    pub total_installments: u32,
    /// Next due date; None once completed
    pub next_due_date: Option<NaiveDate>,
    /// Day-of-month the cycle is anchored to
    pub cycle_anchor_day: u32,
    /// Whether installments are pulled by auto-debit
    pub auto_debit: bool,
    /// Status
    pub status: ScheduleStatus,
    /// Payments recorded, oldest first
    pub payments: Vec<InstallmentPayment>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl EmiSchedule {
    /// Creates the schedule at loan disbursal
    ///
    /// The first due date falls one month after disbursal, anchored to the
    /// disbursal day-of-month.
    pub fn disburse(
        customer_id: CustomerId,
        principal: Money,
        annual_rate: Rate,
        total_installments: u32,
        disbursed_on: NaiveDate,
        auto_debit: bool,
    ) -> Result<Self, LendingError> {
        let installment_amount = emi_amount(principal, annual_rate, total_installments)?;
        let anchor = disbursed_on.day();
        let now = Utc::now();
        let id = LoanId::new_v7();

        Ok(Self {
            id,
            loan_number: generate_loan_number(&id),
            customer_id,
            principal,
            annual_rate,
            installment_amount,
            paid_installments: 0,
            total_installments,
            next_due_date: Some(add_months_clamped(disbursed_on, 1, anchor)),
            cycle_anchor_day: anchor,
            auto_debit,
            status: ScheduleStatus::Active,
            payments: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Records one installment payment
    ///
    /// Increments the paid count, advances the due date a calendar month, and
    /// completes the schedule on the final installment. The paid count can
    /// never exceed the total: recording against a completed schedule fails.
    pub fn record_payment(
        &mut self,
        channel: PaymentChannel,
    ) -> Result<&InstallmentPayment, LendingError> {
        if self.status == ScheduleStatus::Completed {
            return Err(LendingError::ScheduleCompleted);
        }

        self.paid_installments += 1;
        let now = Utc::now();

        self.payments.push(InstallmentPayment {
            sequence: self.paid_installments,
            amount: self.installment_amount,
            channel,
            paid_at: now,
        });

        if self.paid_installments == self.total_installments {
            self.status = ScheduleStatus::Completed;
            self.next_due_date = None;
        } else {
            self.next_due_date = self
                .next_due_date
                .map(|due| add_months_clamped(due, 1, self.cycle_anchor_day));
        }

        self.updated_at = now;
        Ok(self.payments.last().expect("payment just pushed"))
    }

    /// Sets the auto-debit flag
    pub fn set_auto_debit(&mut self, enabled: bool) -> Result<(), LendingError> {
        if self.status == ScheduleStatus::Completed {
            return Err(LendingError::AutoDebitOnCompleted);
        }
        self.auto_debit = enabled;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Installments remaining in the tenor
    pub fn remaining_installments(&self) -> u32 {
        self.total_installments - self.paid_installments
    }
}

fn generate_loan_number(id: &LoanId) -> String {
    let (hi, ..) = id.as_uuid().as_fields();
    format!("LON-{}-{:07}", Utc::now().format("%Y"), hi % 10_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn small_schedule() -> EmiSchedule {
        EmiSchedule::disburse(
            CustomerId::new_v7(),
            Money::new(dec!(30000), Currency::INR),
            Rate::from_percentage(dec!(12)),
            3,
            d(2026, 1, 15),
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_disburse_sets_first_due_date() {
        let schedule = small_schedule();
        assert_eq!(schedule.status, ScheduleStatus::Active);
        assert_eq!(schedule.paid_installments, 0);
        assert_eq!(schedule.next_due_date, Some(d(2026, 2, 15)));
        assert!(schedule.loan_number.starts_with("LON-"));
    }

    #[test]
    fn test_record_payment_advances_cycle() {
        let mut schedule = small_schedule();

        schedule.record_payment(PaymentChannel::Manual).unwrap();
        assert_eq!(schedule.paid_installments, 1);
        assert_eq!(schedule.next_due_date, Some(d(2026, 3, 15)));
        assert_eq!(schedule.status, ScheduleStatus::Active);
    }

    #[test]
    fn test_final_payment_completes() {
        let mut schedule = small_schedule();

        schedule.record_payment(PaymentChannel::Manual).unwrap();
        schedule.record_payment(PaymentChannel::AutoDebit).unwrap();
        schedule.record_payment(PaymentChannel::Manual).unwrap();

        assert_eq!(schedule.status, ScheduleStatus::Completed);
        assert_eq!(schedule.paid_installments, schedule.total_installments);
        assert_eq!(schedule.next_due_date, None);
        assert_eq!(schedule.remaining_installments(), 0);
    }

    #[test]
    fn test_paid_count_never_exceeds_total() {
        let mut schedule = small_schedule();
        for _ in 0..3 {
            schedule.record_payment(PaymentChannel::Manual).unwrap();
        }

        let overpay = schedule.record_payment(PaymentChannel::Manual);
        assert!(matches!(overpay, Err(LendingError::ScheduleCompleted)));
        assert_eq!(schedule.paid_installments, 3);
    }

    #[test]
    fn test_payment_sequence_numbers() {
        let mut schedule = small_schedule();
        schedule.record_payment(PaymentChannel::Manual).unwrap();
        schedule.record_payment(PaymentChannel::Manual).unwrap();

        let sequences: Vec<_> = schedule.payments.iter().map(|p| p.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
    }

    #[test]
    fn test_month_end_anchor_clamps_and_recovers() {
        let mut schedule = EmiSchedule::disburse(
            CustomerId::new_v7(),
            Money::new(dec!(120000), Currency::INR),
            Rate::new(dec!(0)),
            12,
            d(2025, 12, 31),
            true,
        )
        .unwrap();

        // Dec 31 disbursal -> Jan 31 -> Feb 28 -> Mar 31
        assert_eq!(schedule.next_due_date, Some(d(2026, 1, 31)));
        schedule.record_payment(PaymentChannel::AutoDebit).unwrap();
        assert_eq!(schedule.next_due_date, Some(d(2026, 2, 28)));
        schedule.record_payment(PaymentChannel::AutoDebit).unwrap();
        assert_eq!(schedule.next_due_date, Some(d(2026, 3, 31)));
    }

    #[test]
    fn test_auto_debit_toggle() {
        let mut schedule = small_schedule();
        assert!(!schedule.auto_debit);

        schedule.set_auto_debit(true).unwrap();
        assert!(schedule.auto_debit);

        schedule.set_auto_debit(false).unwrap();
        assert!(!schedule.auto_debit);
    }

    #[test]
    fn test_auto_debit_rejected_on_completed() {
        let mut schedule = small_schedule();
        for _ in 0..3 {
            schedule.record_payment(PaymentChannel::Manual).unwrap();
        }

        assert!(matches!(
            schedule.set_auto_debit(true),
            Err(LendingError::AutoDebitOnCompleted)
        ));
    }
}
