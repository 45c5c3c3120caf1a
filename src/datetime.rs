//! Calendar dates, times of day and date-times.
//!
//! These are the payloads of the `Date`, `Time` and `DateTime` nodes. They are
//! plain data with range-checked constructors; conversions to and from
//! [`chrono`] types are provided for consumers that need calendar arithmetic.
//!
//! ```rust
//! use toml_doc::{Date, DateTime, Time, TimeOffset};
//!
//! let dt = DateTime {
//!     date: Date::new(1979, 5, 27).unwrap(),
//!     time: Time::new(7, 32, 0, 0).unwrap(),
//!     offset: Some(TimeOffset::from_minutes(-480).unwrap()),
//! };
//! assert_eq!(dt.to_string(), "1979-05-27T07:32:00-08:00");
//! assert_eq!(dt.to_chrono().unwrap().to_rfc3339(), "1979-05-27T07:32:00-08:00");
//! ```

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;

/// Returns `true` for Gregorian leap years.
#[inline]
#[must_use]
pub const fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` (1-12) of `year`.
#[must_use]
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// A calendar date, year 0-9999.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl Date {
    /// Creates a date, returning `None` if any field is out of range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toml_doc::Date;
    ///
    /// assert!(Date::new(2020, 2, 29).is_some());
    /// assert!(Date::new(2021, 2, 29).is_none());
    /// assert!(Date::new(2021, 13, 1).is_none());
    /// ```
    #[must_use]
    pub fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        if year > 9999 || !(1..=12).contains(&month) {
            return None;
        }
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Date { year, month, day })
    }

    #[must_use]
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
    }
}

impl TryFrom<NaiveDate> for Date {
    type Error = NaiveDate;

    /// Fails for years outside 0-9999.
    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        let year = u16::try_from(date.year()).map_err(|_| date)?;
        Date::new(year, date.month() as u8, date.day() as u8).ok_or(date)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// A time of day with nanosecond precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
}

impl Time {
    /// Creates a time, returning `None` if any field is out of range.
    #[must_use]
    pub fn new(hour: u8, minute: u8, second: u8, nanosecond: u32) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 || nanosecond > 999_999_999 {
            return None;
        }
        Some(Time {
            hour,
            minute,
            second,
            nanosecond,
        })
    }

    #[must_use]
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_nano_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
            self.nanosecond,
        )
    }
}

impl From<NaiveTime> for Time {
    /// Leap-second representations are clamped into the last regular second.
    fn from(time: NaiveTime) -> Self {
        Time {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
            nanosecond: time.nanosecond().min(999_999_999),
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.nanosecond > 0 {
            let digits = format!("{:09}", self.nanosecond);
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

/// A UTC offset in signed minutes, within ±23:59. `Z` is an offset of zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOffset {
    minutes: i16,
}

impl TimeOffset {
    pub const UTC: TimeOffset = TimeOffset { minutes: 0 };

    /// Creates an offset, returning `None` outside ±23:59.
    #[must_use]
    pub fn from_minutes(minutes: i16) -> Option<Self> {
        if minutes.unsigned_abs() > 23 * 60 + 59 {
            return None;
        }
        Some(TimeOffset { minutes })
    }

    #[inline]
    #[must_use]
    pub const fn minutes(&self) -> i16 {
        self.minutes
    }

    #[must_use]
    pub fn to_fixed_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(i32::from(self.minutes) * 60)
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minutes == 0 {
            return f.write_str("Z");
        }
        let sign = if self.minutes < 0 { '-' } else { '+' };
        let abs = self.minutes.unsigned_abs();
        write!(f, "{}{:02}:{:02}", sign, abs / 60, abs % 60)
    }
}

/// A date and time, optionally anchored to a UTC offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DateTime {
    pub date: Date,
    pub time: Time,
    pub offset: Option<TimeOffset>,
}

impl DateTime {
    #[must_use]
    pub fn to_naive_date_time(&self) -> Option<NaiveDateTime> {
        Some(NaiveDateTime::new(
            self.date.to_naive_date()?,
            self.time.to_naive_time()?,
        ))
    }

    /// Converts an offset date-time; returns `None` for local date-times.
    #[must_use]
    pub fn to_chrono(&self) -> Option<chrono::DateTime<FixedOffset>> {
        let offset = self.offset?.to_fixed_offset()?;
        self.to_naive_date_time()?
            .and_local_timezone(offset)
            .single()
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}", self.date, self.time)?;
        if let Some(offset) = &self.offset {
            write!(f, "{}", offset)?;
        }
        Ok(())
    }
}

macro_rules! serialize_as_text {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    serializer.collect_str(self)
                }
            }
        )*
    };
}

serialize_as_text!(Date, Time, TimeOffset, DateTime);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2020));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2021));
        assert_eq!(days_in_month(2020, 2), 29);
        assert_eq!(days_in_month(2021, 2), 28);
        assert_eq!(days_in_month(2021, 4), 30);
        assert_eq!(days_in_month(2021, 12), 31);
    }

    #[test]
    fn test_time_display_trims_fraction() {
        assert_eq!(Time::new(7, 32, 0, 0).unwrap().to_string(), "07:32:00");
        assert_eq!(
            Time::new(0, 32, 0, 999_999_000).unwrap().to_string(),
            "00:32:00.999999"
        );
        assert_eq!(Time::new(23, 59, 59, 500_000_000).unwrap().to_string(), "23:59:59.5");
        assert!(Time::new(24, 0, 0, 0).is_none());
    }

    #[test]
    fn test_offset_bounds_and_display() {
        assert_eq!(TimeOffset::UTC.to_string(), "Z");
        assert_eq!(TimeOffset::from_minutes(330).unwrap().to_string(), "+05:30");
        assert_eq!(TimeOffset::from_minutes(-1439).unwrap().to_string(), "-23:59");
        assert!(TimeOffset::from_minutes(1440).is_none());
    }

    #[test]
    fn test_chrono_round_trip() {
        let date = Date::new(1979, 5, 27).unwrap();
        let naive = date.to_naive_date().unwrap();
        assert_eq!(Date::try_from(naive), Ok(date));

        let time = Time::new(7, 32, 0, 123_000_000).unwrap();
        assert_eq!(Time::from(time.to_naive_time().unwrap()), time);
    }

    #[test]
    fn test_local_datetime_has_no_chrono_instant() {
        let dt = DateTime {
            date: Date::new(1979, 5, 27).unwrap(),
            time: Time::default(),
            offset: None,
        };
        assert!(dt.to_chrono().is_none());
        assert!(dt.to_naive_date_time().is_some());
        assert_eq!(dt.to_string(), "1979-05-27T00:00:00");
    }
}
