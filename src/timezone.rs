//! Helpers for working with the server's configured local timezone.

use time::{Date, Month, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

// Serde support for calendar dates in the `YYYY-MM-DD` format.
time::serde::format_description!(
    pub date_format,
    Date,
    "[year]-[month]-[day]"
);

/// Get the current UTC offset of the timezone named `canonical_timezone`,
/// e.g. "Europe/London".
///
/// Returns `None` if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in the timezone named `canonical_timezone`.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the name is not a known timezone.
pub fn local_today(canonical_timezone: &str) -> Result<Date, Error> {
    let Some(local_offset) = get_local_offset(canonical_timezone) else {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        return Err(Error::InvalidTimezoneError(canonical_timezone.to_owned()));
    };

    Ok(OffsetDateTime::now_utc().to_offset(local_offset).date())
}

/// A calendar month, e.g. 2025-02.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    /// The calendar year.
    pub year: i32,
    /// The month of the year.
    pub month: Month,
}

impl YearMonth {
    /// The month that contains `date`.
    pub fn containing(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a month in the format `YYYY-MM`.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `text` is not in the expected format.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidMonth(text.to_owned());

        let (year, month) = text.split_once('-').ok_or_else(invalid)?;

        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self { year, month })
    }

    /// The first day of the month.
    pub fn first_day(self) -> Date {
        // Day 1 exists in every month, so this cannot fail for a valid year.
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }

    /// The last day of the month, accounting for leap years.
    pub fn last_day(self) -> Date {
        let days = self.month.length(self.year);

        Date::from_calendar_date(self.year, self.month, days).unwrap_or(Date::MAX)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}
