//! Automated screening checks
//!
//! Screening runs at submission and records a per-check breakdown plus the
//! computed risk score. A failed screen never blocks intake: the reviewer
//! sees the outcome and makes the terminal call.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::case::{DocumentKind, RiskScore};

/// Days before expiry at which a document is referred rather than passed
const EXPIRY_REFER_WINDOW_DAYS: i64 = 30;

/// An individual automated check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningCheck {
    DocumentFormat,
    DocumentExpiry,
}

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckResult {
    Pass,
    /// Needs reviewer attention but is not disqualifying on its own
    Refer(String),
    Fail(String),
}

impl CheckResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckResult::Pass)
    }
}

/// The recorded outcome of automated screening
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningOutcome {
    /// Per-check results in execution order
    pub checks: Vec<(ScreeningCheck, CheckResult)>,
    /// Risk score derived from the checks and document kind
    pub risk_score: RiskScore,
}

impl ScreeningOutcome {
    /// An all-pass outcome at low risk, for strong documents
    pub fn clean() -> Self {
        Self {
            checks: vec![
                (ScreeningCheck::DocumentFormat, CheckResult::Pass),
                (ScreeningCheck::DocumentExpiry, CheckResult::Pass),
            ],
            risk_score: RiskScore::Low,
        }
    }

    /// Returns true if every check passed
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|(_, r)| r.is_pass())
    }

    /// Returns the failure messages, if any
    pub fn failures(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter_map(|(_, r)| match r {
                CheckResult::Fail(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Runs the automated checks for a submitted document
pub fn screen(
    kind: &DocumentKind,
    number: &str,
    expiry: Option<NaiveDate>,
    today: NaiveDate,
) -> ScreeningOutcome {
    let format = check_format(kind, number);
    let expiry_check = check_expiry(expiry, today);

    let checks = vec![
        (ScreeningCheck::DocumentFormat, format),
        (ScreeningCheck::DocumentExpiry, expiry_check),
    ];

    let risk_score = score(kind, &checks);
    ScreeningOutcome { checks, risk_score }
}

fn check_format(kind: &DocumentKind, number: &str) -> CheckResult {
    let number = number.trim();
    if number.is_empty() {
        return CheckResult::Fail("document number is empty".to_string());
    }

    let bytes = number.as_bytes();
    let ok = match kind {
        // One letter followed by seven digits
        DocumentKind::Passport => {
            bytes.len() == 8
                && bytes[0].is_ascii_uppercase()
                && bytes[1..].iter().all(|b| b.is_ascii_digit())
        }
        // Twelve digits
        DocumentKind::NationalId => {
            bytes.len() == 12 && bytes.iter().all(|b| b.is_ascii_digit())
        }
        // Five letters, four digits, one letter
        DocumentKind::TaxId => {
            bytes.len() == 10
                && bytes[..5].iter().all(|b| b.is_ascii_uppercase())
                && bytes[5..9].iter().all(|b| b.is_ascii_digit())
                && bytes[9].is_ascii_uppercase()
        }
        // Three letters followed by seven digits
        DocumentKind::VoterId => {
            bytes.len() == 10
                && bytes[..3].iter().all(|b| b.is_ascii_uppercase())
                && bytes[3..].iter().all(|b| b.is_ascii_digit())
        }
        DocumentKind::DriversLicense => {
            bytes.len() >= 8 && bytes.iter().all(|b| b.is_ascii_alphanumeric())
        }
        DocumentKind::UtilityBill | DocumentKind::Other(_) => true,
    };

    if ok {
        CheckResult::Pass
    } else {
        CheckResult::Fail(format!(
            "document number '{}' does not match the {} format",
            number,
            kind.as_str()
        ))
    }
}

fn check_expiry(expiry: Option<NaiveDate>, today: NaiveDate) -> CheckResult {
    match expiry {
        None => CheckResult::Pass,
        Some(date) if date < today => {
            CheckResult::Fail(format!("document expired on {}", date))
        }
        Some(date) if (date - today).num_days() <= EXPIRY_REFER_WINDOW_DAYS => {
            CheckResult::Refer(format!("document expires on {}", date))
        }
        Some(_) => CheckResult::Pass,
    }
}

fn score(kind: &DocumentKind, checks: &[(ScreeningCheck, CheckResult)]) -> RiskScore {
    let any_fail = checks.iter().any(|(_, r)| matches!(r, CheckResult::Fail(_)));
    if any_fail {
        return RiskScore::High;
    }

    let any_refer = checks.iter().any(|(_, r)| matches!(r, CheckResult::Refer(_)));
    // Address-proof documents are weaker identity evidence than photo IDs
    let weak_evidence = matches!(kind, DocumentKind::UtilityBill | DocumentKind::Other(_));

    if any_refer || weak_evidence {
        RiskScore::Medium
    } else {
        RiskScore::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    #[test]
    fn test_valid_passport_screens_low() {
        let outcome = screen(&DocumentKind::Passport, "P1234567", None, today());
        assert!(outcome.all_passed());
        assert_eq!(outcome.risk_score, RiskScore::Low);
    }

    #[test]
    fn test_bad_passport_format_fails_high() {
        let outcome = screen(&DocumentKind::Passport, "12345", None, today());
        assert!(!outcome.all_passed());
        assert_eq!(outcome.risk_score, RiskScore::High);
        assert_eq!(outcome.failures().len(), 1);
    }

    #[test]
    fn test_expired_document_fails() {
        let expired = today().checked_sub_days(Days::new(1)).unwrap();
        let outcome = screen(&DocumentKind::Passport, "P1234567", Some(expired), today());
        assert_eq!(outcome.risk_score, RiskScore::High);
    }

    #[test]
    fn test_near_expiry_refers_medium() {
        let soon = today().checked_add_days(Days::new(10)).unwrap();
        let outcome = screen(&DocumentKind::Passport, "P1234567", Some(soon), today());
        assert!(!outcome.all_passed());
        assert_eq!(outcome.risk_score, RiskScore::Medium);
    }

    #[test]
    fn test_national_id_format() {
        let ok = screen(&DocumentKind::NationalId, "123456789012", None, today());
        assert_eq!(ok.risk_score, RiskScore::Low);

        let bad = screen(&DocumentKind::NationalId, "12345", None, today());
        assert_eq!(bad.risk_score, RiskScore::High);
    }

    #[test]
    fn test_tax_id_format() {
        let ok = screen(&DocumentKind::TaxId, "ABCDE1234F", None, today());
        assert_eq!(ok.risk_score, RiskScore::Low);

        let bad = screen(&DocumentKind::TaxId, "abcde1234f", None, today());
        assert_eq!(bad.risk_score, RiskScore::High);
    }

    #[test]
    fn test_utility_bill_floors_at_medium() {
        let outcome = screen(&DocumentKind::UtilityBill, "ACC-2291-B", None, today());
        assert!(outcome.all_passed());
        assert_eq!(outcome.risk_score, RiskScore::Medium);
    }

    #[test]
    fn test_empty_number_fails() {
        let outcome = screen(&DocumentKind::UtilityBill, "  ", None, today());
        assert_eq!(outcome.risk_score, RiskScore::High);
    }
}
