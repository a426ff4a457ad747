use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::group_by_supervisor;
use crate::error::{ScheduleError, ScheduleResult};
use crate::model::{
    BreakHour, BreakScheduleEntry, Employee, EmployeeId, SUPERVISOR_BREAK_HOUR, StoredRotation,
    SupervisorAssignment, YearMonth,
};
use crate::store::BreakStore;

/// Everything one day's schedule is derived from, already fetched.
pub struct ScheduleInputs<'a> {
    pub roster: &'a [Employee],
    pub assignments: &'a [SupervisorAssignment],
    pub absences: &'a [EmployeeId],
    pub rotation: &'a [StoredRotation],
}

/// Builds the schedule for `date` without touching any store.
///
/// Per supervisor group: absent operators are dropped, the rest keep their stored
/// rotation hour (no renumbering), ordered by hour with ties in roster order, and the
/// supervisor's own slot at 20h closes the group.
pub fn build_schedule(date: NaiveDate, inputs: &ScheduleInputs<'_>) -> Vec<BreakScheduleEntry> {
    let known: HashSet<EmployeeId> = inputs.roster.iter().map(|e| e.id).collect();
    let absent: HashSet<EmployeeId> = inputs.absences.iter().copied().collect();
    let hours = resolve_hours(inputs.rotation);

    let valid = inputs.assignments.iter().filter(|a| {
        for id in [a.operator_id, a.supervisor_id] {
            if !known.contains(&id) {
                let e = ScheduleError::not_found("employee", id);
                warn!(
                    error = %e,
                    operator_id = a.operator_id,
                    supervisor_id = a.supervisor_id,
                    "Skipping dangling supervisor assignment"
                );
                return false;
            }
        }
        true
    });

    let mut entries = Vec::new();
    for group in group_by_supervisor(valid) {
        let mut present: Vec<(BreakHour, EmployeeId)> = group
            .operator_ids
            .iter()
            .filter(|id| !absent.contains(id))
            .map(|id| (hours.get(id).copied().unwrap_or_default(), *id))
            .collect();
        // stable: equal hours keep roster order
        present.sort_by_key(|(hour, _)| *hour);

        debug!(
            supervisor_id = group.supervisor_id,
            assigned = group.operator_ids.len(),
            present = present.len(),
            "Building break group"
        );

        entries.extend(present.into_iter().map(|(hour, operator_id)| BreakScheduleEntry {
            supervisor_id: group.supervisor_id,
            operator_id,
            hour: hour.get(),
            date,
        }));
        entries.push(BreakScheduleEntry {
            supervisor_id: group.supervisor_id,
            operator_id: group.supervisor_id,
            hour: SUPERVISOR_BREAK_HOUR,
            date,
        });
    }
    entries
}

/// The single place where missing or corrupt rotation hours become the default.
fn resolve_hours(rotation: &[StoredRotation]) -> HashMap<EmployeeId, BreakHour> {
    rotation
        .iter()
        .map(|stored| (stored.operator_id, stored.resolve()))
        .collect()
}

/// Regenerates and stores the schedule for `date`.
///
/// Any failed read aborts before the write, and the write replaces the whole day at once,
/// so the previously stored schedule survives every failure.
pub async fn generate<S>(store: &S, date: NaiveDate) -> ScheduleResult<Vec<BreakScheduleEntry>>
where
    S: BreakStore + ?Sized,
{
    let period = YearMonth::from_date(date);

    let roster = store.list_employees().await?;
    let assignments = store.list_supervisor_assignments().await?;
    let absences = store.list_absences(date).await?;
    let rotation = store.list_rotation(period).await?;

    let entries = build_schedule(
        date,
        &ScheduleInputs {
            roster: &roster,
            assignments: &assignments,
            absences: &absences,
            rotation: &rotation,
        },
    );

    store.replace_schedule(date, &entries).await?;

    info!(
        date = %date,
        entries = entries.len(),
        groups = entries.iter().filter(|e| e.is_supervisor_slot()).count(),
        absent = absences.len(),
        "Break schedule generated"
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use crate::store::memory::MemoryStore;
    use crate::store::ScheduleStore;

    const S: EmployeeId = 10;
    const A: EmployeeId = 1;
    const B: EmployeeId = 2;
    const C: EmployeeId = 3;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn march() -> YearMonth {
        YearMonth::new(2025, 3).unwrap()
    }

    /// Supervisor S with operators A, B, C at 15, 16, 17.
    fn group_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.put_employee(S, "S", Role::Supervisor);
        for (id, name, hour) in [(A, "A", 15), (B, "B", 16), (C, "C", 17)] {
            store.put_employee(id, name, Role::Operator);
            store.put_assignment(id, S);
            store.put_raw_rotation(id, march(), hour);
        }
        store
    }

    fn slots(entries: &[BreakScheduleEntry]) -> Vec<(EmployeeId, u8)> {
        entries.iter().map(|e| (e.operator_id, e.hour)).collect()
    }

    #[actix_web::test]
    async fn full_attendance_keeps_rotation_hours() {
        let store = group_store();
        let entries = generate(&store, day()).await.unwrap();
        assert_eq!(slots(&entries), vec![(A, 15), (B, 16), (C, 17), (S, 20)]);
        assert!(entries.iter().all(|e| e.supervisor_id == S && e.date == day()));
    }

    #[actix_web::test]
    async fn absent_operator_leaves_a_gap() {
        let store = group_store();
        store.put_absence(B, day());
        let entries = generate(&store, day()).await.unwrap();
        assert_eq!(slots(&entries), vec![(A, 15), (C, 17), (S, 20)]);
    }

    #[actix_web::test]
    async fn absence_on_another_day_is_ignored() {
        let store = group_store();
        store.put_absence(B, day().succ_opt().unwrap());
        let entries = generate(&store, day()).await.unwrap();
        assert_eq!(entries.len(), 4);
    }

    #[actix_web::test]
    async fn operator_without_rotation_defaults_to_fifteen() {
        let store = group_store();
        const D: EmployeeId = 4;
        store.put_employee(D, "D", Role::Operator);
        store.put_assignment(D, S);
        let entries = generate(&store, day()).await.unwrap();
        // D ties with A at 15 and stays behind it in roster order
        assert_eq!(slots(&entries), vec![(A, 15), (D, 15), (B, 16), (C, 17), (S, 20)]);
    }

    #[test]
    fn sorts_by_hour_not_by_roster() {
        let roster = vec![
            Employee { id: S, name: "S".into(), role: Role::Supervisor },
            Employee { id: A, name: "A".into(), role: Role::Operator },
            Employee { id: B, name: "B".into(), role: Role::Operator },
        ];
        let assignments = [
            SupervisorAssignment { operator_id: A, supervisor_id: S },
            SupervisorAssignment { operator_id: B, supervisor_id: S },
        ];
        let rotation = [
            StoredRotation { operator_id: A, hour: 19 },
            StoredRotation { operator_id: B, hour: 15 },
        ];
        let entries = build_schedule(
            day(),
            &ScheduleInputs {
                roster: &roster,
                assignments: &assignments,
                absences: &[],
                rotation: &rotation,
            },
        );
        assert_eq!(slots(&entries), vec![(B, 15), (A, 19), (S, 20)]);
    }

    #[test]
    fn corrupt_hour_is_treated_as_default() {
        let roster = vec![
            Employee { id: S, name: "S".into(), role: Role::Supervisor },
            Employee { id: A, name: "A".into(), role: Role::Operator },
        ];
        let assignments = [SupervisorAssignment { operator_id: A, supervisor_id: S }];
        let rotation = [StoredRotation { operator_id: A, hour: 23 }];
        let entries = build_schedule(
            day(),
            &ScheduleInputs {
                roster: &roster,
                assignments: &assignments,
                absences: &[],
                rotation: &rotation,
            },
        );
        assert_eq!(slots(&entries), vec![(A, 15), (S, 20)]);
    }

    #[test]
    fn duplicate_hours_are_not_deduplicated() {
        let roster = vec![
            Employee { id: S, name: "S".into(), role: Role::Supervisor },
            Employee { id: A, name: "A".into(), role: Role::Operator },
            Employee { id: B, name: "B".into(), role: Role::Operator },
        ];
        let assignments = [
            SupervisorAssignment { operator_id: A, supervisor_id: S },
            SupervisorAssignment { operator_id: B, supervisor_id: S },
        ];
        let rotation = [
            StoredRotation { operator_id: A, hour: 17 },
            StoredRotation { operator_id: B, hour: 17 },
        ];
        let entries = build_schedule(
            day(),
            &ScheduleInputs {
                roster: &roster,
                assignments: &assignments,
                absences: &[],
                rotation: &rotation,
            },
        );
        assert_eq!(slots(&entries), vec![(A, 17), (B, 17), (S, 20)]);
    }

    #[actix_web::test]
    async fn every_group_gets_exactly_one_supervisor_slot() {
        let store = group_store();
        const T: EmployeeId = 20;
        const E: EmployeeId = 5;
        store.put_employee(T, "T", Role::Supervisor);
        store.put_employee(E, "E", Role::Operator);
        store.put_assignment(E, T);
        store.put_absence(E, day());
        store.put_absence(A, day());

        let entries = generate(&store, day()).await.unwrap();
        for supervisor in [S, T] {
            let own: Vec<_> = entries
                .iter()
                .filter(|e| e.supervisor_id == supervisor && e.hour == SUPERVISOR_BREAK_HOUR)
                .collect();
            assert_eq!(own.len(), 1);
            assert_eq!(own[0].operator_id, supervisor);
        }
        // T's only operator is absent, the group still has its supervisor slot
        assert_eq!(
            entries.iter().filter(|e| e.supervisor_id == T).count(),
            1
        );
        assert!(entries.iter().all(|e| e.operator_id != A && e.operator_id != E));
    }

    #[actix_web::test]
    async fn dangling_assignment_is_skipped() {
        let store = group_store();
        // operator 99 and supervisor 98 are not on the roster
        store.put_assignment(99, S);
        store.put_assignment(A, 98);
        let entries = generate(&store, day()).await.unwrap();
        assert_eq!(slots(&entries), vec![(B, 16), (C, 17), (S, 20)]);
    }

    #[actix_web::test]
    async fn unassigned_operator_is_not_scheduled() {
        let store = group_store();
        store.put_employee(7, "Loose", Role::Operator);
        let entries = generate(&store, day()).await.unwrap();
        assert!(entries.iter().all(|e| e.operator_id != 7));
    }

    #[actix_web::test]
    async fn empty_roster_yields_empty_schedule() {
        let store = MemoryStore::new();
        let entries = generate(&store, day()).await.unwrap();
        assert!(entries.is_empty());
        assert!(store.get_schedule(day()).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn regeneration_replaces_previous_entries() {
        let store = group_store();
        generate(&store, day()).await.unwrap();
        store.put_absence(A, day());
        store.put_absence(C, day());
        generate(&store, day()).await.unwrap();

        let stored = store.get_schedule(day()).await.unwrap();
        assert_eq!(slots(&stored), vec![(B, 16), (S, 20)]);
    }

    #[actix_web::test]
    async fn failed_read_keeps_previous_schedule() {
        let store = group_store();
        let first = generate(&store, day()).await.unwrap();

        store.put_absence(B, day());
        store.fail_reads(true);
        let err = generate(&store, day()).await.unwrap_err();
        assert!(matches!(err, ScheduleError::StorageFailure(_)));

        store.fail_reads(false);
        assert_eq!(store.get_schedule(day()).await.unwrap(), first);
    }

    #[actix_web::test]
    async fn failed_write_keeps_previous_schedule() {
        let store = group_store();
        let first = generate(&store, day()).await.unwrap();

        store.put_absence(A, day());
        store.fail_writes(true);
        assert!(generate(&store, day()).await.is_err());

        store.fail_writes(false);
        assert_eq!(store.get_schedule(day()).await.unwrap(), first);
    }
}
