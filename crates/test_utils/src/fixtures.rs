//! Common fixture values

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, Rate};

/// Standard money values for tests
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A typical personal-loan principal
    pub fn principal() -> Money {
        Money::new(dec!(500000), Currency::INR)
    }

    /// A small consumer-durable principal
    pub fn small_principal() -> Money {
        Money::new(dec!(30000), Currency::INR)
    }

    /// The standard test lending rate
    pub fn lending_rate() -> Rate {
        Rate::from_percentage(dec!(10.5))
    }
}

/// Document numbers that pass (or fail) screening
pub struct DocumentFixtures;

impl DocumentFixtures {
    /// A passport number in the accepted format
    pub fn valid_passport() -> &'static str {
        "P1234567"
    }

    /// A national ID in the accepted format
    pub fn valid_national_id() -> &'static str {
        "123456789012"
    }

    /// A tax ID in the accepted format
    pub fn valid_tax_id() -> &'static str {
        "ABCDE1234F"
    }

    /// A document number no format accepts
    pub fn malformed() -> &'static str {
        "???"
    }
}

/// Dates used across the suites
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A fixed "today" for screening tests
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    /// A disbursal date mid-month, away from clamping edge cases
    pub fn disbursal_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    /// A disbursal date on the 31st, for clamping tests
    pub fn month_end_disbursal() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
    }
}
