use crate::error::{ScheduleError, ScheduleResult};
use crate::model::{Employee, EmployeeId, MAX_GROUP_SIZE, Role, SupervisorAssignment};
use crate::store::{BreakStore, RosterStore};

#[inline]
pub fn normalize_name(name: &str) -> ScheduleResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ScheduleError::validation("name must not be empty"));
    }
    Ok(name.to_string())
}

async fn employee_with_role(
    store: &dyn BreakStore,
    id: EmployeeId,
    role: Role,
) -> ScheduleResult<Employee> {
    let employee = store
        .get_employee(id)
        .await?
        .ok_or_else(|| ScheduleError::not_found("employee", id))?;

    if employee.role != role {
        return Err(ScheduleError::validation(format!(
            "employee {} is a {}, expected a {}",
            id, employee.role, role
        )));
    }
    Ok(employee)
}

/// Checks that `assignment` links an operator to a supervisor whose group has room.
/// Re-assigning an operator to its current group is always allowed.
pub async fn validate_assignment(
    store: &dyn BreakStore,
    assignment: SupervisorAssignment,
) -> ScheduleResult<()> {
    employee_with_role(store, assignment.operator_id, Role::Operator).await?;
    employee_with_role(store, assignment.supervisor_id, Role::Supervisor).await?;

    let members = store
        .list_supervisor_assignments()
        .await?
        .into_iter()
        .filter(|a| {
            a.supervisor_id == assignment.supervisor_id && a.operator_id != assignment.operator_id
        })
        .count();

    if members >= MAX_GROUP_SIZE {
        return Err(ScheduleError::validation(format!(
            "supervisor {} already has {} operators",
            assignment.supervisor_id, MAX_GROUP_SIZE
        )));
    }
    Ok(())
}

/// A role change must not leave dangling assignments behind.
pub async fn validate_role_change(
    store: &dyn BreakStore,
    employee: &Employee,
    role: Role,
) -> ScheduleResult<()> {
    if employee.role == role {
        return Ok(());
    }

    let linked = store
        .list_supervisor_assignments()
        .await?
        .iter()
        .any(|a| a.operator_id == employee.id || a.supervisor_id == employee.id);

    if linked {
        return Err(ScheduleError::validation(format!(
            "employee {} still has supervisor assignments",
            employee.id
        )));
    }
    Ok(())
}
