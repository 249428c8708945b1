//! Slot keys: one hour of one calendar day.
//!
//! The grid runs from 08:00 to the "past midnight" row at 24:00. Keys render as
//! `YYYY-MM-DD-HH`, which is also the identity stored by existing snapshots.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First hour row of the daily grid.
pub const FIRST_HOUR: u8 = 8;

/// Last hour row of the daily grid (the row that ends at 01:00 the next day).
pub const LAST_HOUR: u8 = 24;

/// Exclusive upper bound of the grid; a block may end here.
pub const END_HOUR: u8 = LAST_HOUR + 1;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors for keys outside the grid or in the wrong shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key text is not `YYYY-MM-DD-HH`.
    #[error("malformed slot key {value:?}, expected YYYY-MM-DD-HH")]
    Malformed { value: String },

    /// The hour is outside `08..=24`.
    #[error("hour {hour} is outside the grid ({FIRST_HOUR:02}-{LAST_HOUR:02})")]
    HourOutOfRange { hour: u32 },
}

/// The key of one slot: a date and an hour row.
///
/// Fields are public so callers can build keys cheaply; every store entry point
/// re-checks the hour with [`SlotKey::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotKey {
    pub date: NaiveDate,
    pub hour: u8,
}

impl SlotKey {
    /// Creates a key after checking the hour is on the grid.
    pub fn new(date: NaiveDate, hour: u32) -> Result<Self, KeyError> {
        check_hour(hour)?;
        let hour = u8::try_from(hour).map_err(|_| KeyError::HourOutOfRange { hour })?;
        Ok(Self { date, hour })
    }

    /// Verifies the hour is on the grid.
    pub fn check(self) -> Result<Self, KeyError> {
        check_hour(u32::from(self.hour))?;
        Ok(self)
    }

    /// Keys for every hour of `hours` on `date`, validated.
    pub fn span(date: NaiveDate, hours: Range<u8>) -> Result<Vec<Self>, KeyError> {
        if hours.end > END_HOUR {
            return Err(KeyError::HourOutOfRange {
                hour: u32::from(hours.end) - 1,
            });
        }
        hours.map(|hour| Self::new(date, u32::from(hour))).collect()
    }
}

fn check_hour(hour: u32) -> Result<(), KeyError> {
    if (u32::from(FIRST_HOUR)..=u32::from(LAST_HOUR)).contains(&hour) {
        Ok(())
    } else {
        Err(KeyError::HourOutOfRange { hour })
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.date.format(DATE_FORMAT), self.hour)
    }
}

impl FromStr for SlotKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || KeyError::Malformed {
            value: s.to_string(),
        };

        // "YYYY-MM-DD" + "-" + "HH"
        if s.len() != 13 || !s.is_ascii() || s.as_bytes()[10] != b'-' {
            return Err(malformed());
        }
        let (date_part, hour_part) = (&s[..10], &s[11..]);
        if !hour_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT).map_err(|_| malformed())?;
        let hour: u32 = hour_part.parse().map_err(|_| malformed())?;
        Self::new(date, hour)
    }
}

impl TryFrom<String> for SlotKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotKey> for String {
    fn from(key: SlotKey) -> Self {
        key.to_string()
    }
}

/// Formats an hour row as a wall-clock label, e.g. `24` as `00:00`.
pub fn clock_label(hour: u8) -> String {
    format!("{:02}:00", hour % 24)
}
