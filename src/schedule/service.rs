use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use futures::lock::Mutex;
use moka::future::Cache;
use tracing::{error, info, warn};

use super::events::ScheduleEvent;
use super::{generator, rotation};
use crate::error::{ScheduleError, ScheduleResult};
use crate::model::{AttendanceRecord, BreakScheduleEntry, RotationEntry, YearMonth};
use crate::schedule::rotation::RotationOutcome;
use crate::store::{AttendanceStore, BreakStore, RosterStore, ScheduleStore};

/// Per-date locks are dropped after this long without use.
const DATE_LOCK_IDLE: Duration = Duration::from_secs(3600);
const SCHEDULE_CACHE_CAPACITY: u64 = 10_000;

/// Entry point the HTTP layer and background jobs use for breaks and rotation.
pub struct BreakService {
    store: Arc<dyn BreakStore>,
    schedules: Cache<NaiveDate, Arc<Vec<BreakScheduleEntry>>>,
    date_locks: Cache<NaiveDate, Arc<Mutex<()>>>,
    events: UnboundedSender<ScheduleEvent>,
}

impl BreakService {
    /// Returns the service and the receiving end of its event queue, to be drained by
    /// [`super::events::run_worker`].
    pub fn new(
        store: Arc<dyn BreakStore>,
        cache_ttl: Duration,
    ) -> (Self, UnboundedReceiver<ScheduleEvent>) {
        let (events, receiver) = unbounded();
        let service = Self {
            store,
            schedules: Cache::builder()
                .max_capacity(SCHEDULE_CACHE_CAPACITY)
                .time_to_live(cache_ttl)
                .build(),
            date_locks: Cache::builder().time_to_idle(DATE_LOCK_IDLE).build(),
            events,
        };
        (service, receiver)
    }

    pub fn store(&self) -> &dyn BreakStore {
        self.store.as_ref()
    }

    /// Regenerates the schedule for `date`. Runs for the same date are serialized.
    pub async fn generate_break_schedules(
        &self,
        date: NaiveDate,
    ) -> ScheduleResult<Vec<BreakScheduleEntry>> {
        let lock = self.date_lock(date).await;
        let _guard = lock.lock().await;

        match generator::generate(self.store.as_ref(), date).await {
            Ok(entries) => {
                self.schedules.insert(date, Arc::new(entries.clone())).await;
                Ok(entries)
            }
            Err(e) => {
                error!(error = %e, date = %date, "Break schedule generation failed, keeping previous schedule");
                Err(e)
            }
        }
    }

    /// Stored schedule for `date`, empty if none was generated yet.
    ///
    /// A cache miss is filled under the same per-date lock as regeneration, so a slow read
    /// can never overwrite a newer schedule in the cache.
    pub async fn get_break_schedule(
        &self,
        date: NaiveDate,
    ) -> ScheduleResult<Vec<BreakScheduleEntry>> {
        if let Some(cached) = self.schedules.get(&date).await {
            return Ok(cached.as_ref().clone());
        }

        let lock = self.date_lock(date).await;
        let _guard = lock.lock().await;
        // a regeneration may have filled it while we waited
        if let Some(cached) = self.schedules.get(&date).await {
            return Ok(cached.as_ref().clone());
        }

        let entries = self.store.get_schedule(date).await?;
        self.schedules.insert(date, Arc::new(entries.clone())).await;
        Ok(entries)
    }

    async fn date_lock(&self, date: NaiveDate) -> Arc<Mutex<()>> {
        self.date_locks
            .get_with(date, async { Arc::new(Mutex::new(())) })
            .await
    }

    /// Guarded monthly rotation for the month containing `today`.
    pub async fn rotate_monthly_break_times(
        &self,
        today: NaiveDate,
    ) -> ScheduleResult<RotationOutcome> {
        rotation::check_and_rotate(self.store.as_ref(), today)
            .await
            .map_err(|e| {
                error!(error = %e, today = %today, "Monthly rotation failed, will retry on next check");
                e
            })
    }

    /// Unguarded rotation of one month into the next, for admin use.
    pub async fn rotate_from(&self, from: YearMonth) -> ScheduleResult<Vec<RotationEntry>> {
        rotation::rotate(self.store.as_ref(), from).await
    }

    pub async fn seed_rotation(&self, period: YearMonth) -> ScheduleResult<Vec<RotationEntry>> {
        rotation::seed(self.store.as_ref(), period).await
    }

    /// Stores one attendance record and queues regeneration of that day's schedule.
    pub async fn record_attendance(&self, record: &AttendanceRecord) -> ScheduleResult<()> {
        if self.store.get_employee(record.operator_id).await?.is_none() {
            return Err(ScheduleError::not_found("employee", record.operator_id));
        }

        self.store.upsert_attendance(record).await?;
        info!(
            operator_id = record.operator_id,
            date = %record.date,
            status = %record.status,
            "Attendance recorded"
        );

        self.publish(ScheduleEvent::AttendanceChanged(record.date));
        Ok(())
    }

    fn publish(&self, event: ScheduleEvent) {
        if let Err(e) = self.events.unbounded_send(event) {
            // worker gone; the next manual refresh regenerates
            warn!(error = %e, "Schedule event dropped");
        }
    }
}
