use crate::api::attendance::{AbsenceReport, DayAttendance};
use crate::api::breaks::BreakScheduleResponse;
use crate::api::employee::{AssignSupervisor, CreateEmployee, EmployeeListResponse, UpdateEmployee};
use crate::api::rotation::{RotationMarker, RotationTable};
use crate::model::{
    AbsenceCount, AttendanceRecord, AttendanceStatus, BreakScheduleEntry, DayStatus, Employee,
    Role, RotationEntry, SupervisorAssignment, YearMonth,
};
use crate::schedule::rotation::RotationOutcome;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Break Rotation API",
        version = "0.1.0",
        description = r#"
## Attendance & Break Rotation

Daily attendance for operators grouped under supervisors, and the break schedule derived from it.

### Break schedule
- Each operator takes a one-hour break at their hour for the month (15 to 19, default 15)
- Supervisors always break at 20
- Absent operators are left out of the day; the others keep their hours

### Monthly rotation
- Every operator's hour moves one step each month, 19 wraps to 15
- The guarded run rotates at most once per month

### Response Format
- JSON bodies; errors as `{"message": "..."}`
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::assign_supervisor,
        crate::api::employee::list_assignments,

        crate::api::attendance::record_attendance,
        crate::api::attendance::day_attendance,
        crate::api::attendance::absence_report,

        crate::api::breaks::get_break_schedule,
        crate::api::breaks::generate_break_schedule,

        crate::api::rotation::list_rotation,
        crate::api::rotation::run_monthly_rotation,
        crate::api::rotation::rotate_month,
        crate::api::rotation::seed_rotation,
        crate::api::rotation::rotation_marker
    ),
    components(
        schemas(
            Employee,
            Role,
            SupervisorAssignment,
            CreateEmployee,
            UpdateEmployee,
            AssignSupervisor,
            EmployeeListResponse,
            AttendanceRecord,
            AttendanceStatus,
            DayStatus,
            DayAttendance,
            AbsenceCount,
            AbsenceReport,
            BreakScheduleEntry,
            BreakScheduleResponse,
            YearMonth,
            RotationEntry,
            RotationTable,
            RotationMarker,
            RotationOutcome
        )
    ),
    tags(
        (name = "Employee", description = "Roster and supervisor groups"),
        (name = "Attendance", description = "Daily attendance APIs"),
        (name = "Breaks", description = "Daily break schedules"),
        (name = "Rotation", description = "Monthly break hour rotation"),
    )
)]
pub struct ApiDoc;
