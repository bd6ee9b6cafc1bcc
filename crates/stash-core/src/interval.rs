//! Calendar-aware retention intervals.
//!
//! Intervals are written as ISO 8601 durations (`P30D`, `P1Y2M3D`, `P2W`,
//! `P1DT12H`). Years and months are not a fixed number of days, so an
//! interval only turns into a day count relative to a reference date.
//!
//! Shifting follows the overflow rules of field-wise date arithmetic: the
//! year and month are moved first, then the day is applied on top and any
//! overflow rolls into the following month. `2025-01-31 + P1M` is therefore
//! `2025-03-03`, not a clamped `2025-02-28`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors from parsing or applying an interval.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalError {
    /// The expression is not a valid ISO 8601 duration.
    #[error("Invalid interval '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// Applying the interval left the representable date range.
    #[error("Interval {0} overflows the supported date range")]
    Overflow(String),
}

/// A duration in calendar components. Weeks are folded into days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CalendarInterval {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CalendarInterval {
    /// Interval of whole days.
    #[must_use]
    pub const fn days(days: u32) -> Self {
        Self {
            years: 0,
            months: 0,
            days,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// Interval of whole months.
    #[must_use]
    pub const fn months(months: u32) -> Self {
        Self {
            years: 0,
            months,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// `at + self`.
    ///
    /// # Errors
    ///
    /// Returns `IntervalError::Overflow` if the result is out of range.
    pub fn add_to(&self, at: DateTime<Utc>) -> Result<DateTime<Utc>, IntervalError> {
        self.shift(at)
            .ok_or_else(|| IntervalError::Overflow(self.to_string()))
    }

    /// Number of whole days this interval spans when added to `now`.
    ///
    /// Computed as `add(now, self)` diffed back to `now`, truncated.
    ///
    /// # Errors
    ///
    /// Returns `IntervalError::Overflow` if the shifted date is out of range.
    pub fn days_to_keep_from(&self, now: DateTime<Utc>) -> Result<i64, IntervalError> {
        let until = self.add_to(now)?;
        Ok((until - now).num_days().abs())
    }

    fn shift(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let date = at.date_naive();

        let month_delta = i64::from(self.years) * 12 + i64::from(self.months);
        let total_months = i64::from(date.year()) * 12 + i64::from(date.month0()) + month_delta;
        let year = i32::try_from(total_months.div_euclid(12)).ok()?;
        let month = u32::try_from(total_months.rem_euclid(12)).ok()? + 1;
        let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;

        let day_offset = i64::from(date.day0()) + i64::from(self.days);
        let shifted = first_of_month.checked_add_signed(TimeDelta::try_days(day_offset)?)?;

        let seconds = i64::from(self.hours) * 3600 + i64::from(self.minutes) * 60 + i64::from(self.seconds);
        let naive = shifted
            .and_time(at.time())
            .checked_add_signed(TimeDelta::try_seconds(seconds)?)?;
        Some(naive.and_utc())
    }

    const fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
    }
}

impl FromStr for CalendarInterval {
    type Err = IntervalError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fail = |reason: &str| IntervalError::Parse {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix('P')
            .ok_or_else(|| fail("must start with 'P'"))?;
        if body.is_empty() {
            return Err(fail("no components given"));
        }

        let mut interval = Self::default();
        let mut weeks = 0u32;
        let mut in_time = false;
        let mut saw_component = false;
        let mut saw_time_component = false;
        let mut digits = String::new();
        // Designators must appear in this order within each part.
        let mut last_rank = 0u8;

        for ch in body.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }
            if ch == 'T' {
                if in_time || !digits.is_empty() {
                    return Err(fail("misplaced 'T'"));
                }
                in_time = true;
                last_rank = 0;
                continue;
            }
            if digits.is_empty() {
                return Err(fail(&format!("designator '{ch}' has no value")));
            }
            let value: u32 = digits
                .parse()
                .map_err(|_| fail("component value is too large"))?;
            digits.clear();

            let rank = match (in_time, ch) {
                (false, 'Y') => {
                    interval.years = value;
                    1
                }
                (false, 'M') => {
                    interval.months = value;
                    2
                }
                (false, 'W') => {
                    weeks = value;
                    3
                }
                (false, 'D') => {
                    interval.days = value;
                    4
                }
                (true, 'H') => {
                    interval.hours = value;
                    1
                }
                (true, 'M') => {
                    interval.minutes = value;
                    2
                }
                (true, 'S') => {
                    interval.seconds = value;
                    3
                }
                _ => return Err(fail(&format!("unknown designator '{ch}'"))),
            };
            if rank <= last_rank {
                return Err(fail(&format!("designator '{ch}' is out of order")));
            }
            last_rank = rank;
            saw_component = true;
            saw_time_component |= in_time;
        }

        if !digits.is_empty() {
            return Err(fail("trailing number without designator"));
        }
        if !saw_component {
            return Err(fail("no components given"));
        }
        if in_time && !saw_time_component {
            return Err(fail("'T' must be followed by a time component"));
        }

        interval.days = weeks
            .checked_mul(7)
            .and_then(|week_days| week_days.checked_add(interval.days))
            .ok_or_else(|| fail("day count is too large"))?;
        Ok(interval)
    }
}

impl fmt::Display for CalendarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("P0D");
        }
        f.write_str("P")?;
        if self.years > 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months > 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            f.write_str("T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        }
        Ok(())
    }
}

impl Serialize for CalendarInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
