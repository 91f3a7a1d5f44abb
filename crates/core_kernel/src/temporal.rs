//! Temporal types for due dates, deadlines, and effective periods
//!
//! EMI cycles advance by calendar month and SLA deadlines are computed in the
//! branch's local timezone, so both need more care than naive day arithmetic.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use std::str::FromStr;

/// Timezone wrapper for branch jurisdictions
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Gets the start of day (00:00:00) in this timezone as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(0, 0, 0)
            .unwrap()
            .and_local_timezone(self.0)
            .single()
            .expect("Invalid timezone conversion")
            .with_timezone(&Utc)
    }

    /// Gets the end of day (23:59:59.999999999) in this timezone as UTC
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap()
            .and_local_timezone(self.0)
            .single()
            .expect("Invalid timezone conversion")
            .with_timezone(&Utc)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Asia::Kolkata)
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must be before end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),
}

/// Advances a date by whole calendar months, clamping to month length
///
/// The anchor day is preserved where possible: a schedule disbursed on the
/// 31st falls due on the 30th (or 28th/29th) in shorter months, matching how
/// the bank bills EMI cycles.
pub fn add_months_clamped(date: NaiveDate, months: u32, anchor_day: u32) -> NaiveDate {
    let shifted = date + Months::new(months);
    if shifted.day() >= anchor_day {
        return shifted;
    }
    // chrono already clamped; try to restore the anchor day if this month has it
    shifted
        .with_day(anchor_day)
        .unwrap_or(shifted)
}

/// Represents a period during which a fact is effective
///
/// Used for SLA policy effectivity and agent assignments. The end is
/// exclusive; None means unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidPeriod {
    /// Start of the period (inclusive)
    pub start: DateTime<Utc>,
    /// End of the period (exclusive), None means unbounded
    pub end: Option<DateTime<Utc>>,
}

impl ValidPeriod {
    /// Creates a new period
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<Self, TemporalError> {
        if let Some(end) = end {
            if start >= end {
                return Err(TemporalError::InvalidPeriod {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }
        Ok(Self { start, end })
    }

    /// Creates an unbounded period starting from the given time
    pub fn from(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Creates a bounded period
    pub fn bounded(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TemporalError> {
        Self::new(start, Some(end))
    }

    /// Returns true if the period contains the given instant
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && self.end.map_or(true, |end| at < end)
    }

    /// Returns true if this period overlaps another
    pub fn overlaps(&self, other: &ValidPeriod) -> bool {
        let self_end = self.end.unwrap_or(DateTime::<Utc>::MAX_UTC);
        let other_end = other.end.unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.start < other_end && other.start < self_end
    }
}

/// Returns a deadline the given number of whole hours after a start instant
pub fn deadline_after_hours(start: DateTime<Utc>, hours: u32) -> DateTime<Utc> {
    start + chrono::Duration::hours(hours as i64)
}

/// Returns the number of whole days between today and a due date
///
/// Negative when the due date is in the past.
pub fn days_until(today: NaiveDate, due: NaiveDate) -> i64 {
    (due - today).num_days()
}
