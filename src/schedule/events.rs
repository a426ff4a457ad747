use std::sync::Arc;

use chrono::NaiveDate;
use futures::StreamExt;
use futures::channel::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use super::service::BreakService;

/// Things that make a stored schedule stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleEvent {
    AttendanceChanged(NaiveDate),
}

/// Drains the event queue one event at a time until every sender is gone.
pub async fn run_worker(service: Arc<BreakService>, mut events: UnboundedReceiver<ScheduleEvent>) {
    info!("Schedule event worker started");
    while let Some(event) = events.next().await {
        handle(&service, event).await;
    }
    info!("Schedule event worker stopped");
}

async fn handle(service: &BreakService, event: ScheduleEvent) {
    debug!(?event, "Handling schedule event");
    match event {
        ScheduleEvent::AttendanceChanged(date) => {
            // the stored schedule stays as it was; the service already logged the error
            if let Err(e) = service.generate_break_schedules(date).await {
                debug!(error = %e, date = %date, "Regeneration after attendance change skipped");
            }
        }
    }
}
