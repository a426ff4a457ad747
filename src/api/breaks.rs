use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::ScheduleError, model::BreakScheduleEntry, schedule::service::BreakService};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BreakScheduleResponse {
    #[schema(example = "2025-03-10", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub data: Vec<BreakScheduleEntry>,
}

/// Stored break schedule for a day, grouped by supervisor then by hour.
/// Empty when the day was never generated.
#[utoipa::path(
    get,
    path = "/api/breaks/{date}",
    params(
        ("date", Path, description = "Day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Break schedule", body = BreakScheduleResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Breaks"
)]
pub async fn get_break_schedule(
    service: web::Data<BreakService>,
    path: web::Path<NaiveDate>,
) -> Result<HttpResponse, ScheduleError> {
    let date = path.into_inner();
    let data = service.get_break_schedule(date).await?;
    Ok(HttpResponse::Ok().json(BreakScheduleResponse { date, data }))
}

/// Regenerate a day's schedule from current roster, attendance and rotation.
#[utoipa::path(
    post,
    path = "/api/breaks/{date}/generate",
    params(
        ("date", Path, description = "Day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "New schedule, replacing the previous one", body = BreakScheduleResponse),
        (status = 500, description = "Generation failed; the previous schedule is kept")
    ),
    tag = "Breaks"
)]
pub async fn generate_break_schedule(
    service: web::Data<BreakService>,
    path: web::Path<NaiveDate>,
) -> Result<HttpResponse, ScheduleError> {
    let date = path.into_inner();
    let data = service.generate_break_schedules(date).await?;
    Ok(HttpResponse::Ok().json(BreakScheduleResponse { date, data }))
}
