use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    error::ScheduleError,
    model::{AbsenceCount, AttendanceRecord, DayStatus, EmployeeId, Role, YearMonth},
    schedule::service::BreakService,
    store::{AttendanceStore, RosterStore},
};

/// One roster line of the daily attendance sheet.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DayAttendance {
    #[schema(example = 2)]
    pub employee_id: EmployeeId,
    #[schema(example = "Operador 2")]
    pub name: String,
    pub role: Role,
    pub status: DayStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AbsenceReport {
    pub period: YearMonth,
    pub data: Vec<AbsenceCount>,
}

/// Record attendance
///
/// Writes present/absent for one operator and day. The day's break schedule is
/// regenerated in the background afterwards.
#[utoipa::path(
    put,
    path = "/api/attendance",
    request_body = AttendanceRecord,
    responses(
        (status = 200, description = "Attendance recorded", body = Object, example = json!({
            "message": "Attendance recorded"
        })),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn record_attendance(
    service: web::Data<BreakService>,
    body: web::Json<AttendanceRecord>,
) -> Result<HttpResponse, ScheduleError> {
    service.record_attendance(&body).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance recorded"
    })))
}

/// Attendance sheet for a day; employees without a record are `unregistered`.
#[utoipa::path(
    get,
    path = "/api/attendance/{date}",
    params(
        ("date", Path, description = "Day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Attendance per employee", body = [DayAttendance]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn day_attendance(
    service: web::Data<BreakService>,
    path: web::Path<NaiveDate>,
) -> Result<HttpResponse, ScheduleError> {
    let date = path.into_inner();
    let store = service.store();

    let statuses: HashMap<EmployeeId, _> = store
        .list_attendance(date)
        .await?
        .into_iter()
        .map(|r| (r.operator_id, r.status))
        .collect();

    let sheet: Vec<DayAttendance> = store
        .list_employees()
        .await?
        .into_iter()
        .map(|e| DayAttendance {
            status: DayStatus::from(statuses.get(&e.id).copied()),
            employee_id: e.id,
            name: e.name,
            role: e.role,
        })
        .collect();

    Ok(HttpResponse::Ok().json(sheet))
}

/// Monthly absence totals, only operators with at least one absence.
#[utoipa::path(
    get,
    path = "/api/attendance/absences/{year}/{month}",
    params(
        ("year", Path, description = "Year"),
        ("month", Path, description = "Month, 1-12")
    ),
    responses(
        (status = 200, description = "Absence totals", body = AbsenceReport),
        (status = 400, description = "Invalid month"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn absence_report(
    service: web::Data<BreakService>,
    path: web::Path<(i32, u32)>,
) -> Result<HttpResponse, ScheduleError> {
    let (year, month) = path.into_inner();
    let period = YearMonth::new(year, month)?;

    let data = service.store().count_absences(period).await?;
    Ok(HttpResponse::Ok().json(AbsenceReport { period, data }))
}
