use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::group_by_supervisor;
use crate::error::ScheduleResult;
use crate::model::{
    BreakHour, EmployeeId, RotationEntry, StoredRotation, SupervisorAssignment, YearMonth,
};
use crate::store::BreakStore;

/// A marker older than this is not replayed month by month; only the last step is rotated.
const MAX_CATCH_UP_MONTHS: usize = 12;

/// Result of one guarded monthly check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RotationOutcome {
    /// The marker already covers this month; nothing was written.
    AlreadyRotated { period: YearMonth },
    /// Entries for `period` were written and the marker advanced.
    Rotated { period: YearMonth, entries: usize },
    /// Entries were written but another instance advanced the marker first.
    Superseded { period: YearMonth, entries: usize },
}

/// Next month's entries for every entry of `from`. Pure; corrupt hours count as 15.
pub fn plan_rotation(from: YearMonth, current: &[StoredRotation]) -> Vec<RotationEntry> {
    let to = from.next();
    current
        .iter()
        .map(|stored| RotationEntry::new(stored.operator_id, to, stored.resolve().next()))
        .collect()
}

/// Derives `from.next()`'s rotation table from `from`'s and upserts it.
///
/// Re-running for the same month writes the same rows again.
pub async fn rotate<S>(store: &S, from: YearMonth) -> ScheduleResult<Vec<RotationEntry>>
where
    S: BreakStore + ?Sized,
{
    let current = store.list_rotation(from).await?;
    let next = plan_rotation(from, &current);

    store.upsert_rotation(&next).await?;

    info!(
        from = %from,
        to = %from.next(),
        entries = next.len(),
        "Break hours rotated"
    );
    Ok(next)
}

/// Monthly guard around [`rotate`].
///
/// Skips when the durable marker already equals `today`'s month. Otherwise rotates every
/// month between the marker and `today`'s month, and only then moves the marker with a
/// compare-and-set, so a failure anywhere leaves it stale and the next check retries.
pub async fn check_and_rotate<S>(store: &S, today: NaiveDate) -> ScheduleResult<RotationOutcome>
where
    S: BreakStore + ?Sized,
{
    let current = YearMonth::from_date(today);
    let marker = store.get_rotation_marker().await?;

    if let Some(done) = marker {
        if done >= current {
            if done > current {
                warn!(marker = %done, today = %today, "Rotation marker is ahead of the clock, skipping");
            }
            return Ok(RotationOutcome::AlreadyRotated { period: done });
        }
    }

    let mut entries = 0;
    for from in months_to_rotate(marker, current) {
        entries = rotate(store, from).await?.len();
    }

    if store.set_rotation_marker(marker, current).await? {
        info!(period = %current, entries, "Rotation marker advanced");
        Ok(RotationOutcome::Rotated {
            period: current,
            entries,
        })
    } else {
        warn!(period = %current, "Rotation marker moved by another instance");
        Ok(RotationOutcome::Superseded {
            period: current,
            entries,
        })
    }
}

/// Source months to rotate, oldest first, ending with `current.prev()`.
fn months_to_rotate(marker: Option<YearMonth>, current: YearMonth) -> Vec<YearMonth> {
    let last = current.prev();
    let Some(done) = marker else {
        return vec![last];
    };

    let mut months = Vec::new();
    let mut from = done;
    while from < current && months.len() < MAX_CATCH_UP_MONTHS {
        months.push(from);
        from = from.next();
    }
    if months.last() != Some(&last) {
        months = vec![last];
    }
    months
}

/// Fills in rotation rows for operators that have none in `period`.
///
/// Each such operator gets the lowest hour not yet taken in its group, or 15 when the
/// group is already full. Existing rows are left alone.
pub fn plan_seed(
    period: YearMonth,
    assignments: &[SupervisorAssignment],
    existing: &HashMap<EmployeeId, BreakHour>,
) -> Vec<RotationEntry> {
    let mut entries = Vec::new();
    for group in group_by_supervisor(assignments) {
        let mut taken: BTreeSet<BreakHour> = group
            .operator_ids
            .iter()
            .filter_map(|id| existing.get(id).copied())
            .collect();

        for operator_id in group.operator_ids.iter().filter(|id| !existing.contains_key(id)) {
            let hour = BreakHour::all()
                .find(|h| !taken.contains(h))
                .unwrap_or_default();
            taken.insert(hour);
            entries.push(RotationEntry::new(*operator_id, period, hour));
        }
    }
    entries
}

pub async fn seed<S>(store: &S, period: YearMonth) -> ScheduleResult<Vec<RotationEntry>>
where
    S: BreakStore + ?Sized,
{
    let assignments = store.list_supervisor_assignments().await?;
    let existing: HashMap<EmployeeId, BreakHour> = store
        .list_rotation(period)
        .await?
        .iter()
        .map(|stored| (stored.operator_id, stored.resolve()))
        .collect();

    let entries = plan_seed(period, &assignments, &existing);
    store.upsert_rotation(&entries).await?;

    info!(period = %period, seeded = entries.len(), "Rotation table seeded");
    Ok(entries)
}
