//! Calendar-driven RCON command scheduling.
//!
//! Commands are registered against a [`Period`] before the client connects.
//! Every date notification from the server then yields the daily commands,
//! plus the monthly ones on the 1st, plus the yearly ones on 1 January, in
//! that order and each in registration order. Templates may contain `%Y`,
//! `%M` and `%D`, which expand to the zero-padded year, month and day.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Daily,
    Monthly,
    Yearly,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Daily, Period::Monthly, Period::Yearly];

    pub fn name(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Monthly => "monthly",
            Period::Yearly => "yearly",
        }
    }

    /// Whether a date notification for `date` crosses this period's boundary.
    pub fn fires_on(self, date: NaiveDate) -> bool {
        match self {
            Period::Daily => true,
            Period::Monthly => date.day() == 1,
            Period::Yearly => date.day() == 1 && date.month() == 1,
        }
    }
}

impl FromStr for Period {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Period::Daily),
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            other => Err(ProtocolError::UnknownPeriod(other.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registered command templates, one list per period.
#[derive(Debug, Clone, Default)]
pub struct CalendarScheduler {
    daily: Vec<String>,
    monthly: Vec<String>,
    yearly: Vec<String>,
}

impl CalendarScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, period: Period, command: impl Into<String>) {
        self.commands_mut(period).push(command.into());
    }

    /// Register by period name; only `daily`, `monthly` and `yearly` are accepted.
    pub fn register_named(
        &mut self,
        period: &str,
        command: impl Into<String>,
    ) -> crate::error::Result<()> {
        let period = period.parse::<Period>()?;
        self.register(period, command);
        Ok(())
    }

    pub fn commands(&self, period: Period) -> &[String] {
        match period {
            Period::Daily => &self.daily,
            Period::Monthly => &self.monthly,
            Period::Yearly => &self.yearly,
        }
    }

    fn commands_mut(&mut self, period: Period) -> &mut Vec<String> {
        match period {
            Period::Daily => &mut self.daily,
            Period::Monthly => &mut self.monthly,
            Period::Yearly => &mut self.yearly,
        }
    }

    pub fn is_empty(&self) -> bool {
        Period::ALL.iter().all(|p| self.commands(*p).is_empty())
    }

    /// Expanded commands to issue for a date notification, in dispatch order.
    pub fn commands_for(&self, date: NaiveDate) -> Vec<String> {
        Period::ALL
            .iter()
            .filter(|period| period.fires_on(date))
            .flat_map(|period| self.commands(*period))
            .map(|template| expand_template(template, date))
            .collect()
    }
}

/// Substitute `%Y`, `%M` and `%D` with the zero-padded date parts.
pub fn expand_template(template: &str, date: NaiveDate) -> String {
    template
        .replace("%Y", &format!("{:04}", date.year()))
        .replace("%M", &format!("{:02}", date.month()))
        .replace("%D", &format!("{:02}", date.day()))
}
