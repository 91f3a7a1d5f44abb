//! Comprehensive tests for domain_lending

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, CustomerId, Money, Rate};
use domain_lending::{
    emi_amount, outstanding_principal, total_interest,
    EmiSchedule, LendingError, PaymentChannel, ScheduleStatus,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn inr(amount: Decimal) -> Money {
    Money::new(amount, Currency::INR)
}

// ============================================================================
// Amortization
// ============================================================================

mod amortization {
    use super::*;

    #[test]
    fn test_emi_times_tenor_covers_principal_plus_interest() {
        let principal = inr(dec!(250000));
        let rate = Rate::from_percentage(dec!(9.25));
        let n = 36;

        let emi = emi_amount(principal, rate, n).unwrap();
        let interest = total_interest(principal, rate, n).unwrap();

        let total_paid = emi.multiply(Decimal::from(n));
        assert_eq!(
            total_paid.amount(),
            principal.amount() + interest.amount()
        );
        assert!(interest.is_positive());
    }

    #[test]
    fn test_higher_rate_means_higher_emi() {
        let principal = inr(dec!(100000));
        let cheap = emi_amount(principal, Rate::from_percentage(dec!(8)), 24).unwrap();
        let dear = emi_amount(principal, Rate::from_percentage(dec!(14)), 24).unwrap();
        assert!(dear.amount() > cheap.amount());
    }

    #[test]
    fn test_longer_tenor_means_lower_emi() {
        let principal = inr(dec!(100000));
        let rate = Rate::from_percentage(dec!(10));
        let short = emi_amount(principal, rate, 12).unwrap();
        let long = emi_amount(principal, rate, 48).unwrap();
        assert!(long.amount() < short.amount());
    }

    proptest! {
        /// The outstanding balance is always between zero and the principal
        #[test]
        fn outstanding_stays_in_bounds(
            principal_rupees in 10_000i64..10_000_000,
            rate_bp in 0u32..2400,
            tenor in 6u32..120,
        ) {
            let principal = inr(Decimal::from(principal_rupees));
            let rate = Rate::from_percentage(Decimal::from(rate_bp) / dec!(100));

            for paid in [0, tenor / 2, tenor] {
                let balance = outstanding_principal(principal, rate, tenor, paid).unwrap();
                prop_assert!(!balance.is_negative());
                prop_assert!(balance.amount() <= principal.amount() + dec!(1));
            }
        }
    }
}

// ============================================================================
// Schedule lifecycle
// ============================================================================

mod schedule {
    use super::*;

    fn schedule(n: u32) -> EmiSchedule {
        EmiSchedule::disburse(
            CustomerId::new_v7(),
            inr(dec!(120000)),
            Rate::from_percentage(dec!(11)),
            n,
            d(2026, 1, 10),
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_disbursal_defaults() {
        let s = schedule(12);
        assert_eq!(s.status, ScheduleStatus::Active);
        assert_eq!(s.paid_installments, 0);
        assert_eq!(s.total_installments, 12);
        assert_eq!(s.remaining_installments(), 12);
        assert_eq!(s.next_due_date, Some(d(2026, 2, 10)));
        assert!(s.payments.is_empty());
    }

    #[test]
    fn test_each_payment_advances_one_month() {
        let mut s = schedule(12);
        let mut expected = vec![
            d(2026, 3, 10),
            d(2026, 4, 10),
            d(2026, 5, 10),
        ]
        .into_iter();

        for _ in 0..3 {
            s.record_payment(PaymentChannel::Manual).unwrap();
            assert_eq!(s.next_due_date, Some(expected.next().unwrap()));
        }
        assert_eq!(s.paid_installments, 3);
        assert_eq!(s.remaining_installments(), 9);
    }

    #[test]
    fn test_completion_is_terminal_and_due_date_clears() {
        let mut s = schedule(2);
        s.record_payment(PaymentChannel::AutoDebit).unwrap();
        s.record_payment(PaymentChannel::AutoDebit).unwrap();

        assert_eq!(s.status, ScheduleStatus::Completed);
        assert_eq!(s.next_due_date, None);

        assert!(matches!(
            s.record_payment(PaymentChannel::Manual),
            Err(LendingError::ScheduleCompleted)
        ));
        assert!(matches!(
            s.set_auto_debit(true),
            Err(LendingError::AutoDebitOnCompleted)
        ));
    }

    #[test]
    fn test_paid_count_bounded_by_total() {
        let mut s = schedule(5);
        for _ in 0..5 {
            s.record_payment(PaymentChannel::Manual).unwrap();
        }
        assert!(s.record_payment(PaymentChannel::Manual).is_err());
        assert_eq!(s.paid_installments, s.total_installments);
    }

    #[test]
    fn test_payment_channels_recorded() {
        let mut s = schedule(3);
        s.record_payment(PaymentChannel::AutoDebit).unwrap();
        s.record_payment(PaymentChannel::Manual).unwrap();

        let channels: Vec<_> = s.payments.iter().map(|p| p.channel).collect();
        assert_eq!(channels, vec![PaymentChannel::AutoDebit, PaymentChannel::Manual]);
    }

    #[test]
    fn test_month_end_cycle_clamps() {
        let mut s = EmiSchedule::disburse(
            CustomerId::new_v7(),
            inr(dec!(50000)),
            Rate::new(dec!(0)),
            6,
            d(2026, 8, 31),
            true,
        )
        .unwrap();

        assert_eq!(s.next_due_date, Some(d(2026, 9, 30)));
        s.record_payment(PaymentChannel::AutoDebit).unwrap();
        assert_eq!(s.next_due_date, Some(d(2026, 10, 31)));
    }

    #[test]
    fn test_invalid_terms_rejected_at_disbursal() {
        let bad_installments = EmiSchedule::disburse(
            CustomerId::new_v7(),
            inr(dec!(50000)),
            Rate::new(dec!(0.1)),
            0,
            d(2026, 1, 1),
            false,
        );
        assert!(bad_installments.is_err());

        let bad_principal = EmiSchedule::disburse(
            CustomerId::new_v7(),
            inr(dec!(-1)),
            Rate::new(dec!(0.1)),
            12,
            d(2026, 1, 1),
            false,
        );
        assert!(bad_principal.is_err());
    }
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_schedule_round_trips_through_json() {
    let mut s = EmiSchedule::disburse(
        CustomerId::new_v7(),
        inr(dec!(75000)),
        Rate::from_percentage(dec!(10)),
        6,
        d(2026, 2, 5),
        true,
    )
    .unwrap();
    s.record_payment(PaymentChannel::AutoDebit).unwrap();

    let json = serde_json::to_string(&s).unwrap();
    let back: EmiSchedule = serde_json::from_str(&json).unwrap();

    assert_eq!(back.id, s.id);
    assert_eq!(back.paid_installments, 1);
    assert_eq!(back.installment_amount, s.installment_amount);
    assert_eq!(back.next_due_date, s.next_due_date);
}
