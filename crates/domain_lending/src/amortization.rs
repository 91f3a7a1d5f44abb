//! EMI amortization math
//!
//! Standard reducing-balance amortization: for principal P, monthly rate r,
//! and n installments,
//!
//! ```text
//! EMI = P * r * (1+r)^n / ((1+r)^n - 1)
//! ```
//!
//! All arithmetic is exact decimal; the EMI itself is rounded to the
//! currency's minor unit with banker's rounding.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Money, Rate};

use crate::error::LendingError;

/// Integer power by repeated multiplication
///
/// Installment counts are bounded (30-year tenors are 360 months), so the
/// naive loop is fine and avoids pulling in the maths feature set.
fn pow(base: Decimal, exp: u32) -> Decimal {
    let mut acc = dec!(1);
    for _ in 0..exp {
        acc *= base;
    }
    acc
}

/// Computes the fixed monthly installment for a loan
///
/// `annual_rate` is the nominal annual rate; the monthly rate is one twelfth.
/// A zero rate degenerates to an even principal split.
pub fn emi_amount(
    principal: Money,
    annual_rate: Rate,
    total_installments: u32,
) -> Result<Money, LendingError> {
    if total_installments == 0 {
        return Err(LendingError::InvalidTerms(
            "total installments must be positive".to_string(),
        ));
    }
    if !principal.is_positive() {
        return Err(LendingError::InvalidTerms(
            "principal must be positive".to_string(),
        ));
    }
    if annual_rate.as_decimal().is_sign_negative() {
        return Err(LendingError::InvalidTerms(
            "interest rate must not be negative".to_string(),
        ));
    }

    let r = annual_rate.monthly().as_decimal();
    if r.is_zero() {
        let split = principal
            .divide(Decimal::from(total_installments))
            .map_err(|e| LendingError::InvalidTerms(e.to_string()))?;
        return Ok(split.round_bankers(principal.currency().decimal_places()));
    }

    let growth = pow(dec!(1) + r, total_installments);
    let factor = r * growth / (growth - dec!(1));

    Ok(principal
        .multiply(factor)
        .round_bankers(principal.currency().decimal_places()))
}

/// Total interest payable over the full tenor
pub fn total_interest(
    principal: Money,
    annual_rate: Rate,
    total_installments: u32,
) -> Result<Money, LendingError> {
    let emi = emi_amount(principal, annual_rate, total_installments)?;
    let total_paid = emi.multiply(Decimal::from(total_installments));
    total_paid
        .checked_sub(&principal)
        .map_err(|e| LendingError::InvalidTerms(e.to_string()))
}

/// Outstanding principal after `paid_installments` payments
///
/// Reducing-balance closed form: B_k = P(1+r)^k - EMI * ((1+r)^k - 1) / r.
pub fn outstanding_principal(
    principal: Money,
    annual_rate: Rate,
    total_installments: u32,
    paid_installments: u32,
) -> Result<Money, LendingError> {
    if paid_installments > total_installments {
        return Err(LendingError::InvalidTerms(
            "paid installments exceed total".to_string(),
        ));
    }
    if paid_installments == total_installments {
        return Ok(Money::zero(principal.currency()));
    }

    let emi = emi_amount(principal, annual_rate, total_installments)?;
    let r = annual_rate.monthly().as_decimal();

    if r.is_zero() {
        let remaining = total_installments - paid_installments;
        return Ok(emi.multiply(Decimal::from(remaining)));
    }

    let growth = pow(dec!(1) + r, paid_installments);
    let balance = principal.amount() * growth - emi.amount() * (growth - dec!(1)) / r;

    Ok(Money::new(balance, principal.currency())
        .round_bankers(principal.currency().decimal_places()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;

    fn inr(amount: Decimal) -> Money {
        Money::new(amount, Currency::INR)
    }

    #[test]
    fn test_emi_known_value() {
        // 5,00,000 at 10.5% over 60 months: the widely published figure is 10,747
        let emi = emi_amount(inr(dec!(500000)), Rate::from_percentage(dec!(10.5)), 60).unwrap();
        assert_eq!(emi.amount().round(), dec!(10747));
    }

    #[test]
    fn test_emi_zero_rate_is_even_split() {
        let emi = emi_amount(inr(dec!(120000)), Rate::new(dec!(0)), 12).unwrap();
        assert_eq!(emi.amount(), dec!(10000));
    }

    #[test]
    fn test_emi_rejects_zero_installments() {
        assert!(emi_amount(inr(dec!(1000)), Rate::new(dec!(0.1)), 0).is_err());
    }

    #[test]
    fn test_emi_rejects_non_positive_principal() {
        assert!(emi_amount(inr(dec!(0)), Rate::new(dec!(0.1)), 12).is_err());
        assert!(emi_amount(inr(dec!(-100)), Rate::new(dec!(0.1)), 12).is_err());
    }

    #[test]
    fn test_emi_rejects_negative_rate() {
        assert!(emi_amount(inr(dec!(1000)), Rate::new(dec!(-0.01)), 12).is_err());
    }

    #[test]
    fn test_total_interest_positive() {
        let principal = inr(dec!(500000));
        let rate = Rate::from_percentage(dec!(10.5));
        let emi = emi_amount(principal, rate, 60).unwrap();
        let interest = total_interest(principal, rate, 60).unwrap();

        assert!(interest.is_positive());
        assert_eq!(interest.amount(), emi.amount() * dec!(60) - dec!(500000));
        // Roughly 1.45 lakh over the five-year tenor
        assert!(interest.amount() > dec!(140000) && interest.amount() < dec!(150000));
    }

    #[test]
    fn test_outstanding_principal_bounds() {
        let principal = inr(dec!(500000));
        let rate = Rate::from_percentage(dec!(10.5));

        let at_start = outstanding_principal(principal, rate, 60, 0).unwrap();
        assert_eq!(at_start.amount(), principal.amount());

        let at_end = outstanding_principal(principal, rate, 60, 60).unwrap();
        assert!(at_end.is_zero());

        let halfway = outstanding_principal(principal, rate, 60, 30).unwrap();
        assert!(halfway.is_positive());
        assert!(halfway.amount() < principal.amount());
    }

    #[test]
    fn test_outstanding_principal_rejects_overpayment() {
        let principal = inr(dec!(500000));
        assert!(outstanding_principal(principal, Rate::new(dec!(0.1)), 60, 61).is_err());
    }

    #[test]
    fn test_outstanding_decreases_monotonically() {
        let principal = inr(dec!(250000));
        let rate = Rate::from_percentage(dec!(9));
        let mut last = principal.amount() + dec!(1);
        for paid in 0..=24 {
            let balance = outstanding_principal(principal, rate, 24, paid).unwrap();
            assert!(balance.amount() < last);
            last = balance.amount();
        }
    }
}
