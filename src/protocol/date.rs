//! In-game calendar dates.
//!
//! The server counts days since 1 January of year 0 on the proleptic Gregorian
//! calendar, where year 0 is a leap year.

use chrono::{Days, NaiveDate};

use crate::error::{ProtocolError, Result};

/// 1 January, year 0.
pub fn epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(0, 1, 1)
}

/// Convert a day count from the server into a calendar date.
pub fn date_from_days(days: u32) -> Result<NaiveDate> {
    epoch()
        .and_then(|epoch| epoch.checked_add_days(Days::new(u64::from(days))))
        .ok_or(ProtocolError::InvalidDate(days))
}

/// Inverse of [`date_from_days`]; `None` for dates before the epoch.
pub fn days_from_date(date: NaiveDate) -> Option<u32> {
    let days = date.signed_duration_since(epoch()?).num_days();
    u32::try_from(days).ok()
}
