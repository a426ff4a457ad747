use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    error::ScheduleError,
    model::{Employee, EmployeeId, Role, SupervisorAssignment},
    schedule::service::BreakService,
    store::RosterStore,
    utils::validation::{normalize_name, validate_assignment, validate_role_change},
};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Operador 1", value_type = String)]
    pub name: String,
    pub role: Role,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    #[schema(example = "Operador 1")]
    pub name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct AssignSupervisor {
    #[schema(example = 10)]
    pub supervisor_id: EmployeeId,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    #[schema(
    example = json!([{
        "id": 1,
        "name": "Operador 1",
        "role": "operator"
    }])
)]
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub total: usize,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = Employee),
        (status = 400, description = "Invalid name", body = Object, example = json!({
            "message": "validation failure: name must not be empty"
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Something went wrong, Contact with system admin"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    service: web::Data<BreakService>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ScheduleError> {
    let name = normalize_name(&payload.name)?;
    let employee = service.store().create_employee(&name, payload.role).await?;

    info!(employee_id = employee.id, role = %employee.role, "Employee created");
    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employee",
    responses(
        (status = 200, description = "Employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    service: web::Data<BreakService>,
) -> Result<HttpResponse, ScheduleError> {
    let employees = service.store().list_employees().await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        total: employees.len(),
        data: employees,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee 7 not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    service: web::Data<BreakService>,
    path: web::Path<EmployeeId>,
) -> Result<HttpResponse, ScheduleError> {
    let employee_id = path.into_inner();

    let employee = service
        .store()
        .get_employee(employee_id)
        .await?
        .ok_or_else(|| ScheduleError::not_found("employee", employee_id))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
///
/// Changing the role of an employee that is still part of a group is rejected.
#[utoipa::path(
    put,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 400, description = "Invalid name or role change"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    service: web::Data<BreakService>,
    path: web::Path<EmployeeId>,
    body: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, ScheduleError> {
    let employee_id = path.into_inner();
    let store = service.store();

    let mut employee = store
        .get_employee(employee_id)
        .await?
        .ok_or_else(|| ScheduleError::not_found("employee", employee_id))?;

    if let Some(name) = &body.name {
        employee.name = normalize_name(name)?;
    }
    if let Some(role) = body.role {
        validate_role_change(store, &employee, role).await?;
        employee.role = role;
    }

    store.update_employee(&employee).await?;
    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee
///
/// Also removes the employee's supervisor assignments and attendance.
#[utoipa::path(
    delete,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error", body = Object)
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    service: web::Data<BreakService>,
    path: web::Path<EmployeeId>,
) -> Result<HttpResponse, ScheduleError> {
    let employee_id = path.into_inner();

    if !service.store().delete_employee(employee_id).await? {
        return Err(ScheduleError::not_found("employee", employee_id));
    }

    info!(employee_id, "Employee deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

/// Assign an operator to a supervisor's group, replacing any previous group.
#[utoipa::path(
    put,
    path = "/api/employee/{employee_id}/supervisor",
    params(
        ("employee_id", Path, description = "Operator ID")
    ),
    request_body = AssignSupervisor,
    responses(
        (status = 200, description = "Operator assigned", body = SupervisorAssignment),
        (status = 400, description = "Wrong roles or group already full", body = Object, example = json!({
            "message": "validation failure: supervisor 10 already has 5 operators"
        })),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn assign_supervisor(
    service: web::Data<BreakService>,
    path: web::Path<EmployeeId>,
    body: web::Json<AssignSupervisor>,
) -> Result<HttpResponse, ScheduleError> {
    let assignment = SupervisorAssignment {
        operator_id: path.into_inner(),
        supervisor_id: body.supervisor_id,
    };

    validate_assignment(service.store(), assignment).await?;
    service.store().assign_supervisor(assignment).await?;

    info!(
        operator_id = assignment.operator_id,
        supervisor_id = assignment.supervisor_id,
        "Operator assigned to supervisor"
    );
    Ok(HttpResponse::Ok().json(assignment))
}

#[utoipa::path(
    get,
    path = "/api/assignment",
    responses(
        (status = 200, description = "All operator to supervisor links, in roster order", body = [SupervisorAssignment])
    ),
    tag = "Employee"
)]
pub async fn list_assignments(
    service: web::Data<BreakService>,
) -> Result<HttpResponse, ScheduleError> {
    let assignments = service.store().list_supervisor_assignments().await?;
    Ok(HttpResponse::Ok().json(assignments))
}
