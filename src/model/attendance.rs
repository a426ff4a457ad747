use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::employee::EmployeeId;

/// Stored attendance state. "Unregistered" is never stored: it is the absence of a record.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// What the roster view shows for one employee on one day.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DayStatus {
    Present,
    Absent,
    Unregistered,
}

impl From<Option<AttendanceStatus>> for DayStatus {
    fn from(status: Option<AttendanceStatus>) -> Self {
        match status {
            Some(AttendanceStatus::Present) => DayStatus::Present,
            Some(AttendanceStatus::Absent) => DayStatus::Absent,
            None => DayStatus::Unregistered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 2)]
    pub operator_id: EmployeeId,

    #[schema(example = "2025-03-10", value_type = String, format = "date")]
    pub date: NaiveDate,

    pub status: AttendanceStatus,
}

/// Monthly absence total for one operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AbsenceCount {
    #[schema(example = 2)]
    pub operator_id: EmployeeId,
    #[schema(example = "Operador 2")]
    pub name: String,
    #[schema(example = 3)]
    pub absences: i64,
}
