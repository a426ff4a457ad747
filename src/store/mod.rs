//! Read/write contracts the break engine runs against.
//!
//! The generator and rotation engine only see these traits; the HTTP layer holds an
//! `Arc<dyn BreakStore>` so the backing technology can change without touching them.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::ScheduleResult;
use crate::model::{
    AbsenceCount, AttendanceRecord, BreakScheduleEntry, Employee, EmployeeId, Role, RotationEntry,
    StoredRotation, SupervisorAssignment, YearMonth,
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn list_employees(&self) -> ScheduleResult<Vec<Employee>>;

    async fn get_employee(&self, id: EmployeeId) -> ScheduleResult<Option<Employee>>;

    async fn create_employee(&self, name: &str, role: Role) -> ScheduleResult<Employee>;

    async fn update_employee(&self, employee: &Employee) -> ScheduleResult<()>;

    /// Also drops the employee's assignments and attendance; rotation history is kept.
    /// Returns false if nothing was deleted.
    async fn delete_employee(&self, id: EmployeeId) -> ScheduleResult<bool>;

    /// In roster order (order of first assignment).
    async fn list_supervisor_assignments(&self) -> ScheduleResult<Vec<SupervisorAssignment>>;

    /// Overwrites the operator's current assignment, if any.
    async fn assign_supervisor(&self, assignment: SupervisorAssignment) -> ScheduleResult<()>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Operator ids with an `absent` record on `date`.
    async fn list_absences(&self, date: NaiveDate) -> ScheduleResult<Vec<EmployeeId>>;

    async fn list_attendance(&self, date: NaiveDate) -> ScheduleResult<Vec<AttendanceRecord>>;

    /// One record per (operator, date); a second write replaces the status.
    async fn upsert_attendance(&self, record: &AttendanceRecord) -> ScheduleResult<()>;

    /// Operators with at least one absence in `period`.
    async fn count_absences(&self, period: YearMonth) -> ScheduleResult<Vec<AbsenceCount>>;
}

#[async_trait]
pub trait RotationStore: Send + Sync {
    async fn list_rotation(&self, period: YearMonth) -> ScheduleResult<Vec<StoredRotation>>;

    /// Keyed by (operator_id, month, year). All entries land or none do.
    async fn upsert_rotation(&self, entries: &[RotationEntry]) -> ScheduleResult<()>;

    async fn get_rotation_marker(&self) -> ScheduleResult<Option<YearMonth>>;

    /// Compare-and-set. Returns false when the stored marker is no longer `expected`.
    async fn set_rotation_marker(
        &self,
        expected: Option<YearMonth>,
        next: YearMonth,
    ) -> ScheduleResult<bool>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Delete-then-insert in one transaction.
    async fn replace_schedule(
        &self,
        date: NaiveDate,
        entries: &[BreakScheduleEntry],
    ) -> ScheduleResult<()>;

    /// Entries in the order they were written.
    async fn get_schedule(&self, date: NaiveDate) -> ScheduleResult<Vec<BreakScheduleEntry>>;
}

pub trait BreakStore: RosterStore + AttendanceStore + RotationStore + ScheduleStore {}

impl<T> BreakStore for T where T: RosterStore + AttendanceStore + RotationStore + ScheduleStore {}
