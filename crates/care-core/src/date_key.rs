//! Integer date keys and display formatting.
//!
//! Treatment sheets store dates as display text. Every comparison goes through
//! [`DateKey`] (`YYYY*10000 + MM*100 + DD`) so no timezone-aware date object is
//! ever involved.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Sortable `YYYYMMDD` integer. Zero means unparseable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(pub u32);

impl DateKey {
    /// Key of an unparseable date; sorts before every valid key.
    pub const INVALID: DateKey = DateKey(0);

    /// Parse `DD/MM/YYYY` or `YYYY-MM-DD`, ignoring anything from the first `T`.
    ///
    /// Years outside `1..=9999` are unparseable.
    pub fn parse(input: &str) -> Self {
        let text = input.trim();
        let text = text.split('T').next().unwrap_or_default();

        let slash: Vec<&str> = text.split('/').collect();
        let dash: Vec<&str> = text.split('-').collect();
        let (year, month, day) = if slash.len() == 3 {
            (slash[2], slash[1], slash[0])
        } else if dash.len() == 3 {
            (dash[0], dash[1], dash[2])
        } else {
            return Self::INVALID;
        };

        match (number(year), number(month), number(day)) {
            (Some(y), Some(m), Some(d))
                if (1..=9999).contains(&y) && (1..=12).contains(&m) && (1..=31).contains(&d) =>
            {
                DateKey(y * 10_000 + m * 100 + d)
            }
            _ => Self::INVALID,
        }
    }

    /// Key of a calendar date; dates outside years `1..=9999` have no key.
    pub fn from_date(date: NaiveDate) -> Self {
        match u32::try_from(date.year()) {
            Ok(year) if (1..=9999).contains(&year) => {
                DateKey(year * 10_000 + date.month() * 100 + date.day())
            }
            _ => Self::INVALID,
        }
    }

    /// True unless this is [`DateKey::INVALID`].
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Convert back to a calendar date, if the key names a real day.
    pub fn to_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt((self.0 / 10_000) as i32, (self.0 / 100) % 100, self.0 % 100)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_date() {
            Some(date) => f.write_str(&format_dmy(date)),
            None => f.write_str("invalid date"),
        }
    }
}

fn number(part: &str) -> Option<u32> {
    part.trim().parse().ok()
}

/// Format as `DD/MM/YYYY`.
pub fn format_dmy(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Hebrew long weekday name, as written in the `יום` column.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Sun => "יום ראשון",
        Weekday::Mon => "יום שני",
        Weekday::Tue => "יום שלישי",
        Weekday::Wed => "יום רביעי",
        Weekday::Thu => "יום חמישי",
        Weekday::Fri => "יום שישי",
        Weekday::Sat => "יום שבת",
    }
}
