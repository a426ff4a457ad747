use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ScheduleError,
    model::{RotationEntry, YearMonth},
    schedule::{rotation::RotationOutcome, service::BreakService},
    store::RotationStore,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RotationTable {
    pub period: YearMonth,
    pub data: Vec<RotationEntry>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RotationMarker {
    /// Last month the rotation ran into; absent before the first run.
    pub last_rotated: Option<YearMonth>,
}

fn period(path: web::Path<(i32, u32)>) -> Result<YearMonth, ScheduleError> {
    let (year, month) = path.into_inner();
    YearMonth::new(year, month)
}

/// Break hours in effect for a month. Corrupt stored hours show as 15, as used when generating.
#[utoipa::path(
    get,
    path = "/api/rotation/{year}/{month}",
    params(
        ("year", Path, description = "Year"),
        ("month", Path, description = "Month, 1-12")
    ),
    responses(
        (status = 200, description = "Rotation table", body = RotationTable),
        (status = 400, description = "Invalid year or month")
    ),
    tag = "Rotation"
)]
pub async fn list_rotation(
    service: web::Data<BreakService>,
    path: web::Path<(i32, u32)>,
) -> Result<HttpResponse, ScheduleError> {
    let period = period(path)?;

    let data = service
        .store()
        .list_rotation(period)
        .await?
        .iter()
        .map(|row| RotationEntry::new(row.operator_id, period, row.resolve()))
        .collect();

    Ok(HttpResponse::Ok().json(RotationTable { period, data }))
}

/// Run the guarded monthly check for today. At most one rotation per month.
#[utoipa::path(
    post,
    path = "/api/rotation/run",
    responses(
        (status = 200, description = "Outcome of the check", body = RotationOutcome),
        (status = 500, description = "Rotation failed; the marker is left unchanged")
    ),
    tag = "Rotation"
)]
pub async fn run_monthly_rotation(
    service: web::Data<BreakService>,
) -> Result<HttpResponse, ScheduleError> {
    let today = Local::now().date_naive();
    let outcome = service.rotate_monthly_break_times(today).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Rotate a month into the next one without touching the marker.
#[utoipa::path(
    post,
    path = "/api/rotation/{year}/{month}/rotate",
    params(
        ("year", Path, description = "Source year"),
        ("month", Path, description = "Source month, 1-12")
    ),
    responses(
        (status = 200, description = "Entries written for the following month", body = RotationTable),
        (status = 400, description = "Invalid year or month")
    ),
    tag = "Rotation"
)]
pub async fn rotate_month(
    service: web::Data<BreakService>,
    path: web::Path<(i32, u32)>,
) -> Result<HttpResponse, ScheduleError> {
    let from = period(path)?;
    let data = service.rotate_from(from).await?;
    Ok(HttpResponse::Ok().json(RotationTable {
        period: from.next(),
        data,
    }))
}

/// Give every assigned operator without an entry the lowest free hour of its group.
#[utoipa::path(
    post,
    path = "/api/rotation/{year}/{month}/seed",
    params(
        ("year", Path, description = "Year"),
        ("month", Path, description = "Month, 1-12")
    ),
    responses(
        (status = 200, description = "Entries that were added", body = RotationTable),
        (status = 400, description = "Invalid year or month")
    ),
    tag = "Rotation"
)]
pub async fn seed_rotation(
    service: web::Data<BreakService>,
    path: web::Path<(i32, u32)>,
) -> Result<HttpResponse, ScheduleError> {
    let period = period(path)?;
    let data = service.seed_rotation(period).await?;
    Ok(HttpResponse::Ok().json(RotationTable { period, data }))
}

#[utoipa::path(
    get,
    path = "/api/rotation/marker",
    responses(
        (status = 200, description = "Last rotated month", body = RotationMarker)
    ),
    tag = "Rotation"
)]
pub async fn rotation_marker(
    service: web::Data<BreakService>,
) -> Result<HttpResponse, ScheduleError> {
    let last_rotated = service.store().get_rotation_marker().await?;
    Ok(HttpResponse::Ok().json(RotationMarker { last_rotated }))
}
