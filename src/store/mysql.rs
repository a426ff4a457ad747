use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, MySql, MySqlPool, QueryBuilder};
use tracing::{debug, error};

use super::{AttendanceStore, RosterStore, RotationStore, ScheduleStore};
use crate::error::{ScheduleError, ScheduleResult};
use crate::model::{
    AbsenceCount, AttendanceRecord, AttendanceStatus, BreakScheduleEntry, Employee, EmployeeId,
    Role, RotationEntry, StoredRotation, SupervisorAssignment, YearMonth,
};

/// Only one marker row ever exists.
const MARKER_ROW_ID: u8 = 1;

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct EmployeeRow {
    id: u64,
    name: String,
    role: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = ScheduleError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).map_err(|_| {
            ScheduleError::validation(format!("employee {} has unknown role {}", row.id, row.role))
        })?;
        Ok(Employee {
            id: row.id,
            name: row.name,
            role,
        })
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    employee_id: u64,
    date: NaiveDate,
    status: String,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = ScheduleError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = AttendanceStatus::from_str(&row.status).map_err(|_| {
            ScheduleError::validation(format!("unknown attendance status {}", row.status))
        })?;
        Ok(AttendanceRecord {
            operator_id: row.employee_id,
            date: row.date,
            status,
        })
    }
}

#[async_trait]
impl RosterStore for MySqlStore {
    async fn list_employees(&self) -> ScheduleResult<Vec<Employee>> {
        let rows = sqlx::query_as::<_, EmployeeRow>("SELECT id, name, role FROM employees ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch employees");
                ScheduleError::from(e)
            })?;

        rows.into_iter().map(Employee::try_from).collect()
    }

    async fn get_employee(&self, id: EmployeeId) -> ScheduleResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>("SELECT id, name, role FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Employee::try_from).transpose()
    }

    async fn create_employee(&self, name: &str, role: Role) -> ScheduleResult<Employee> {
        let result = sqlx::query("INSERT INTO employees (name, role) VALUES (?, ?)")
            .bind(name)
            .bind(role.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create employee");
                ScheduleError::from(e)
            })?;

        Ok(Employee {
            id: result.last_insert_id(),
            name: name.to_string(),
            role,
        })
    }

    async fn update_employee(&self, employee: &Employee) -> ScheduleResult<()> {
        sqlx::query("UPDATE employees SET name = ?, role = ? WHERE id = ?")
            .bind(&employee.name)
            .bind(employee.role.to_string())
            .bind(employee.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_employee(&self, id: EmployeeId) -> ScheduleResult<bool> {
        // assignments and attendance go with it (ON DELETE CASCADE); rotation rows stay
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_supervisor_assignments(&self) -> ScheduleResult<Vec<SupervisorAssignment>> {
        let rows = sqlx::query_as::<_, SupervisorAssignment>(
            "SELECT operator_id, supervisor_id FROM supervisor_assignments ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn assign_supervisor(&self, assignment: SupervisorAssignment) -> ScheduleResult<()> {
        sqlx::query(
            r#"
            INSERT INTO supervisor_assignments (operator_id, supervisor_id)
            VALUES (?, ?)
            ON DUPLICATE KEY UPDATE supervisor_id = VALUES(supervisor_id)
            "#,
        )
        .bind(assignment.operator_id)
        .bind(assignment.supervisor_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn list_absences(&self, date: NaiveDate) -> ScheduleResult<Vec<EmployeeId>> {
        let ids = sqlx::query_scalar::<_, u64>(
            "SELECT employee_id FROM attendance WHERE date = ? AND status = ?",
        )
        .bind(date)
        .bind(AttendanceStatus::Absent.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn list_attendance(&self, date: NaiveDate) -> ScheduleResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            "SELECT employee_id, date, status FROM attendance WHERE date = ? ORDER BY employee_id",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    async fn upsert_attendance(&self, record: &AttendanceRecord) -> ScheduleResult<()> {
        sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, status)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE status = VALUES(status)
            "#,
        )
        .bind(record.operator_id)
        .bind(record.date)
        .bind(record.status.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, operator_id = record.operator_id, date = %record.date, "Attendance write failed");
            ScheduleError::from(e)
        })?;
        Ok(())
    }

    async fn count_absences(&self, period: YearMonth) -> ScheduleResult<Vec<AbsenceCount>> {
        let (start, end) = period.date_range()?;
        let rows = sqlx::query_as::<_, AbsenceCount>(
            r#"
            SELECT e.id AS operator_id, e.name AS name, COUNT(*) AS absences
            FROM attendance a
            JOIN employees e ON e.id = a.employee_id
            WHERE a.status = ?
            AND e.role = ?
            AND a.date >= ? AND a.date < ?
            GROUP BY e.id, e.name
            ORDER BY e.id
            "#,
        )
        .bind(AttendanceStatus::Absent.to_string())
        .bind(Role::Operator.to_string())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl RotationStore for MySqlStore {
    async fn list_rotation(&self, period: YearMonth) -> ScheduleResult<Vec<StoredRotation>> {
        let rows = sqlx::query_as::<_, StoredRotation>(
            "SELECT operator_id, hour FROM break_rotations WHERE month = ? AND year = ? ORDER BY operator_id",
        )
        .bind(period.month)
        .bind(period.year)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn upsert_rotation(&self, entries: &[RotationEntry]) -> ScheduleResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        let mut builder: QueryBuilder<MySql> =
            QueryBuilder::new("INSERT INTO break_rotations (operator_id, month, year, hour) ");
        builder.push_values(entries, |mut row, entry| {
            row.push_bind(entry.operator_id)
                .push_bind(entry.month)
                .push_bind(entry.year)
                .push_bind(entry.hour.get());
        });
        builder.push(" ON DUPLICATE KEY UPDATE hour = VALUES(hour)");

        debug!(
            rows = entries.len(),
            period = ?entries.first().map(|e| e.period()),
            "Upserting rotation entries"
        );
        builder.build().execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_rotation_marker(&self) -> ScheduleResult<Option<YearMonth>> {
        let row = sqlx::query_as::<_, (u8, i32)>("SELECT month, year FROM rotation_marker WHERE id = ?")
            .bind(MARKER_ROW_ID)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(month, year)| YearMonth::new(year, u32::from(month)))
            .transpose()
    }

    async fn set_rotation_marker(
        &self,
        expected: Option<YearMonth>,
        next: YearMonth,
    ) -> ScheduleResult<bool> {
        let result = match expected {
            None => {
                sqlx::query("INSERT IGNORE INTO rotation_marker (id, month, year) VALUES (?, ?, ?)")
                    .bind(MARKER_ROW_ID)
                    .bind(next.month)
                    .bind(next.year)
                    .execute(&self.pool)
                    .await?
            }
            Some(current) => {
                sqlx::query(
                    r#"
                    UPDATE rotation_marker
                    SET month = ?, year = ?
                    WHERE id = ?
                    AND month = ? AND year = ?
                    "#,
                )
                .bind(next.month)
                .bind(next.year)
                .bind(MARKER_ROW_ID)
                .bind(current.month)
                .bind(current.year)
                .execute(&self.pool)
                .await?
            }
        };

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl ScheduleStore for MySqlStore {
    async fn replace_schedule(
        &self,
        date: NaiveDate,
        entries: &[BreakScheduleEntry],
    ) -> ScheduleResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM break_schedules WHERE date = ?")
            .bind(date)
            .execute(&mut *tx)
            .await?;

        if !entries.is_empty() {
            let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
                "INSERT INTO break_schedules (date, supervisor_id, operator_id, hour) ",
            );
            builder.push_values(entries, |mut row, entry| {
                row.push_bind(entry.date)
                    .push_bind(entry.supervisor_id)
                    .push_bind(entry.operator_id)
                    .push_bind(entry.hour);
            });
            builder.build().execute(&mut *tx).await?;
        }

        // dropping tx without commit rolls back, so a failed insert keeps the old schedule
        tx.commit().await?;
        Ok(())
    }

    async fn get_schedule(&self, date: NaiveDate) -> ScheduleResult<Vec<BreakScheduleEntry>> {
        let rows = sqlx::query_as::<_, BreakScheduleEntry>(
            "SELECT supervisor_id, operator_id, hour, date FROM break_schedules WHERE date = ? ORDER BY id",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
