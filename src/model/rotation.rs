use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::employee::EmployeeId;
use crate::error::{ScheduleError, ScheduleResult};

/// Hour used for operators with no rotation row, or with a corrupt one.
pub const DEFAULT_BREAK_HOUR: u8 = 15;
/// Supervisors always break last; never stored in the rotation table.
pub const SUPERVISOR_BREAK_HOUR: u8 = 20;
/// One distinct hour per operator in 15..=19.
pub const MAX_GROUP_SIZE: usize = 5;

/// Rotating operator break hour, always within 15..=19.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BreakHour(u8);

impl BreakHour {
    pub const FIRST: BreakHour = BreakHour(15);
    pub const LAST: BreakHour = BreakHour(19);

    pub fn new(hour: u8) -> ScheduleResult<Self> {
        if (Self::FIRST.0..=Self::LAST.0).contains(&hour) {
            Ok(BreakHour(hour))
        } else {
            Err(ScheduleError::validation(format!(
                "break hour {} outside {}..={}",
                hour,
                Self::FIRST.0,
                Self::LAST.0
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Next month's hour: one slot later, 19 wraps to 15.
    pub fn next(self) -> Self {
        if self == Self::LAST {
            Self::FIRST
        } else {
            BreakHour(self.0 + 1)
        }
    }

    pub fn all() -> impl Iterator<Item = BreakHour> {
        (Self::FIRST.0..=Self::LAST.0).map(BreakHour)
    }
}

impl Default for BreakHour {
    fn default() -> Self {
        BreakHour(DEFAULT_BREAK_HOUR)
    }
}

impl TryFrom<u8> for BreakHour {
    type Error = ScheduleError;

    fn try_from(hour: u8) -> Result<Self, Self::Error> {
        BreakHour::new(hour)
    }
}

impl From<BreakHour> for u8 {
    fn from(hour: BreakHour) -> Self {
        hour.0
    }
}

/// Calendar month key of the rotation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub struct YearMonth {
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
}

impl YearMonth {
    /// Years are limited to what a calendar date can hold, so `next`/`prev` never overflow.
    pub fn new(year: i32, month: u32) -> ScheduleResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(ScheduleError::validation(format!("month {} outside 1..=12", month)));
        }
        let years = NaiveDate::MIN.year()..=NaiveDate::MAX.year();
        if !years.contains(&year) {
            return Err(ScheduleError::validation(format!(
                "year {} outside {}..={}",
                year,
                years.start(),
                years.end()
            )));
        }
        Ok(YearMonth { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            YearMonth { year: self.year + 1, month: 1 }
        } else {
            YearMonth { year: self.year, month: self.month + 1 }
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            YearMonth { year: self.year - 1, month: 12 }
        } else {
            YearMonth { year: self.year, month: self.month - 1 }
        }
    }

    /// Date range `[first day, first day of next month)`.
    pub fn date_range(self) -> ScheduleResult<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1);
        let next = self.next();
        let end = NaiveDate::from_ymd_opt(next.year, next.month, 1);
        match (start, end) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(ScheduleError::validation(format!("{} is not a valid month", self))),
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One operator's break hour for one month, unique per (operator, month, year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RotationEntry {
    #[schema(example = 2)]
    pub operator_id: EmployeeId,
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 16, value_type = u8)]
    pub hour: BreakHour,
}

impl RotationEntry {
    pub fn new(operator_id: EmployeeId, period: YearMonth, hour: BreakHour) -> Self {
        RotationEntry {
            operator_id,
            month: period.month,
            year: period.year,
            hour,
        }
    }

    pub fn period(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

/// Raw `(operator_id, hour)` as stored. The hour is not trusted until resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredRotation {
    pub operator_id: EmployeeId,
    pub hour: u8,
}

impl StoredRotation {
    /// Out-of-range hours fall back to the default instead of failing the run.
    pub fn resolve(&self) -> BreakHour {
        BreakHour::new(self.hour).unwrap_or_else(|e| {
            tracing::warn!(operator_id = self.operator_id, error = %e, "Invalid stored rotation hour, using default");
            BreakHour::default()
        })
    }
}
