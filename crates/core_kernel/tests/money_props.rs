//! Property tests for money arithmetic

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};

proptest! {
    /// Splitting never creates or destroys minor units
    #[test]
    fn split_installments_preserves_total(
        minor in 1i64..1_000_000_000,
        parts in 1u32..360,
    ) {
        let money = Money::from_minor(minor, Currency::INR);
        let installments = money.split_installments(parts).unwrap();

        prop_assert_eq!(installments.len(), parts as usize);

        let total: Decimal = installments.iter().map(|m| m.amount()).sum();
        prop_assert_eq!(total, money.amount());
    }

    /// Installment sizes differ by at most one minor unit
    #[test]
    fn split_installments_is_even(
        minor in 1i64..1_000_000_000,
        parts in 1u32..360,
    ) {
        let money = Money::from_minor(minor, Currency::INR);
        let installments = money.split_installments(parts).unwrap();

        let max = installments.iter().map(|m| m.amount()).max().unwrap();
        let min = installments.iter().map(|m| m.amount()).min().unwrap();
        prop_assert!(max - min <= Decimal::new(1, 2));
    }

    /// Checked addition round-trips with subtraction
    #[test]
    fn add_then_sub_round_trips(
        a in 0i64..1_000_000_000,
        b in 0i64..1_000_000_000,
    ) {
        let x = Money::from_minor(a, Currency::INR);
        let y = Money::from_minor(b, Currency::INR);

        let sum = x.checked_add(&y).unwrap();
        let back = sum.checked_sub(&y).unwrap();
        prop_assert_eq!(back.amount(), x.amount());
    }
}
