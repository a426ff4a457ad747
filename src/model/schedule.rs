use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::employee::EmployeeId;

/// One break slot of one day. `operator_id == supervisor_id` marks the supervisor's own 20h slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "supervisor_id": 10,
        "operator_id": 2,
        "hour": 16,
        "date": "2025-03-10"
    })
)]
pub struct BreakScheduleEntry {
    pub supervisor_id: EmployeeId,
    pub operator_id: EmployeeId,
    pub hour: u8,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
}

impl BreakScheduleEntry {
    pub fn is_supervisor_slot(&self) -> bool {
        self.operator_id == self.supervisor_id
    }
}
