//! In-process store for tests, with switches to make reads or writes fail.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::channel::oneshot;

use super::{AttendanceStore, RosterStore, RotationStore, ScheduleStore};
use crate::error::{ScheduleError, ScheduleResult};
use crate::model::{
    AbsenceCount, AttendanceRecord, AttendanceStatus, BreakScheduleEntry, Employee, EmployeeId,
    Role, RotationEntry, StoredRotation, SupervisorAssignment, YearMonth,
};

#[derive(Default)]
struct Inner {
    next_id: EmployeeId,
    employees: Vec<Employee>,
    assignments: Vec<SupervisorAssignment>,
    attendance: Vec<AttendanceRecord>,
    rotations: BTreeMap<(YearMonth, EmployeeId), u8>,
    schedules: BTreeMap<NaiveDate, Vec<BreakScheduleEntry>>,
    marker: Option<YearMonth>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    schedule_read_hold: Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>,
    marker_after_upsert: Mutex<Option<YearMonth>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Adds an employee with an explicit id, bypassing id allocation.
    pub fn put_employee(&self, id: EmployeeId, name: &str, role: Role) {
        let mut inner = self.inner.lock().unwrap();
        inner.employees.push(Employee {
            id,
            name: name.to_string(),
            role,
        });
        inner.next_id = inner.next_id.max(id);
    }

    pub fn put_assignment(&self, operator_id: EmployeeId, supervisor_id: EmployeeId) {
        let mut inner = self.inner.lock().unwrap();
        upsert_assignment(&mut inner, SupervisorAssignment { operator_id, supervisor_id });
    }

    /// Writes a rotation hour without range checks, like a hand-edited row.
    pub fn put_raw_rotation(&self, operator_id: EmployeeId, period: YearMonth, hour: u8) {
        let mut inner = self.inner.lock().unwrap();
        inner.rotations.insert((period, operator_id), hour);
    }

    pub fn rotation_hour(&self, operator_id: EmployeeId, period: YearMonth) -> Option<u8> {
        let inner = self.inner.lock().unwrap();
        inner.rotations.get(&(period, operator_id)).copied()
    }

    pub fn rotation_row_count(&self) -> usize {
        self.inner.lock().unwrap().rotations.len()
    }

    pub fn put_marker(&self, marker: YearMonth) {
        self.inner.lock().unwrap().marker = Some(marker);
    }

    pub fn put_absence(&self, operator_id: EmployeeId, date: NaiveDate) {
        let mut inner = self.inner.lock().unwrap();
        upsert_record(
            &mut inner,
            AttendanceRecord {
                operator_id,
                date,
                status: AttendanceStatus::Absent,
            },
        );
    }

    /// The next `get_schedule` signals `reached` once it has read its rows, then waits
    /// for `resume` before returning them.
    pub fn hold_next_schedule_read(&self, reached: oneshot::Sender<()>, resume: oneshot::Receiver<()>) {
        *self.schedule_read_hold.lock().unwrap() = Some((reached, resume));
    }

    /// The next `upsert_rotation` also moves the marker, like a concurrent instance would.
    pub fn move_marker_after_next_upsert(&self, marker: YearMonth) {
        *self.marker_after_upsert.lock().unwrap() = Some(marker);
    }

    fn check_read(&self) -> ScheduleResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ScheduleError::StorageFailure("read failed".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> ScheduleResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ScheduleError::StorageFailure("write failed".into()));
        }
        Ok(())
    }
}

fn upsert_assignment(inner: &mut Inner, assignment: SupervisorAssignment) {
    match inner
        .assignments
        .iter_mut()
        .find(|a| a.operator_id == assignment.operator_id)
    {
        Some(existing) => existing.supervisor_id = assignment.supervisor_id,
        None => inner.assignments.push(assignment),
    }
}

fn upsert_record(inner: &mut Inner, record: AttendanceRecord) {
    match inner
        .attendance
        .iter_mut()
        .find(|r| r.operator_id == record.operator_id && r.date == record.date)
    {
        Some(existing) => existing.status = record.status,
        None => inner.attendance.push(record),
    }
}

#[async_trait]
impl RosterStore for MemoryStore {
    async fn list_employees(&self) -> ScheduleResult<Vec<Employee>> {
        self.check_read()?;
        Ok(self.inner.lock().unwrap().employees.clone())
    }

    async fn get_employee(&self, id: EmployeeId) -> ScheduleResult<Option<Employee>> {
        self.check_read()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn create_employee(&self, name: &str, role: Role) -> ScheduleResult<Employee> {
        self.check_write()?;
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let employee = Employee {
            id: inner.next_id,
            name: name.to_string(),
            role,
        };
        inner.employees.push(employee.clone());
        Ok(employee)
    }

    async fn update_employee(&self, employee: &Employee) -> ScheduleResult<()> {
        self.check_write()?;
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.employees.iter_mut().find(|e| e.id == employee.id) {
            *existing = employee.clone();
        }
        Ok(())
    }

    async fn delete_employee(&self, id: EmployeeId) -> ScheduleResult<bool> {
        self.check_write()?;
        let mut inner = self.inner.lock().unwrap();
        let before = inner.employees.len();
        inner.employees.retain(|e| e.id != id);
        inner
            .assignments
            .retain(|a| a.operator_id != id && a.supervisor_id != id);
        inner.attendance.retain(|r| r.operator_id != id);
        Ok(inner.employees.len() < before)
    }

    async fn list_supervisor_assignments(&self) -> ScheduleResult<Vec<SupervisorAssignment>> {
        self.check_read()?;
        Ok(self.inner.lock().unwrap().assignments.clone())
    }

    async fn assign_supervisor(&self, assignment: SupervisorAssignment) -> ScheduleResult<()> {
        self.check_write()?;
        upsert_assignment(&mut self.inner.lock().unwrap(), assignment);
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn list_absences(&self, date: NaiveDate) -> ScheduleResult<Vec<EmployeeId>> {
        self.check_read()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .attendance
            .iter()
            .filter(|r| r.date == date && r.status == AttendanceStatus::Absent)
            .map(|r| r.operator_id)
            .collect())
    }

    async fn list_attendance(&self, date: NaiveDate) -> ScheduleResult<Vec<AttendanceRecord>> {
        self.check_read()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .attendance
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    async fn upsert_attendance(&self, record: &AttendanceRecord) -> ScheduleResult<()> {
        self.check_write()?;
        upsert_record(&mut self.inner.lock().unwrap(), record.clone());
        Ok(())
    }

    async fn count_absences(&self, period: YearMonth) -> ScheduleResult<Vec<AbsenceCount>> {
        self.check_read()?;
        let inner = self.inner.lock().unwrap();
        let mut counts: BTreeMap<EmployeeId, i64> = BTreeMap::new();
        for record in inner.attendance.iter().filter(|r| {
            r.status == AttendanceStatus::Absent && YearMonth::from_date(r.date) == period
        }) {
            *counts.entry(record.operator_id).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .filter_map(|(operator_id, absences)| {
                inner
                    .employees
                    .iter()
                    .find(|e| e.id == operator_id && e.role == Role::Operator)
                    .map(|e| AbsenceCount {
                        operator_id,
                        name: e.name.clone(),
                        absences,
                    })
            })
            .collect())
    }
}

#[async_trait]
impl RotationStore for MemoryStore {
    async fn list_rotation(&self, period: YearMonth) -> ScheduleResult<Vec<StoredRotation>> {
        self.check_read()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rotations
            .iter()
            .filter(|((p, _), _)| *p == period)
            .map(|((_, operator_id), hour)| StoredRotation {
                operator_id: *operator_id,
                hour: *hour,
            })
            .collect())
    }

    async fn upsert_rotation(&self, entries: &[RotationEntry]) -> ScheduleResult<()> {
        self.check_write()?;
        let mut inner = self.inner.lock().unwrap();
        for entry in entries {
            inner
                .rotations
                .insert((entry.period(), entry.operator_id), entry.hour.get());
        }
        if let Some(marker) = self.marker_after_upsert.lock().unwrap().take() {
            inner.marker = Some(marker);
        }
        Ok(())
    }

    async fn get_rotation_marker(&self) -> ScheduleResult<Option<YearMonth>> {
        self.check_read()?;
        Ok(self.inner.lock().unwrap().marker)
    }

    async fn set_rotation_marker(
        &self,
        expected: Option<YearMonth>,
        next: YearMonth,
    ) -> ScheduleResult<bool> {
        self.check_write()?;
        let mut inner = self.inner.lock().unwrap();
        if inner.marker != expected {
            return Ok(false);
        }
        inner.marker = Some(next);
        Ok(true)
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn replace_schedule(
        &self,
        date: NaiveDate,
        entries: &[BreakScheduleEntry],
    ) -> ScheduleResult<()> {
        self.check_write()?;
        self.inner
            .lock()
            .unwrap()
            .schedules
            .insert(date, entries.to_vec());
        Ok(())
    }

    async fn get_schedule(&self, date: NaiveDate) -> ScheduleResult<Vec<BreakScheduleEntry>> {
        self.check_read()?;
        let rows = self
            .inner
            .lock()
            .unwrap()
            .schedules
            .get(&date)
            .cloned()
            .unwrap_or_default();

        let hold = self.schedule_read_hold.lock().unwrap().take();
        if let Some((reached, resume)) = hold {
            let _ = reached.send(());
            let _ = resume.await;
        }
        Ok(rows)
    }
}
