pub mod attendance;
pub mod employee;
pub mod role;
pub mod rotation;
pub mod schedule;

pub use attendance::{AbsenceCount, AttendanceRecord, AttendanceStatus, DayStatus};
pub use employee::{Employee, EmployeeId, SupervisorAssignment};
pub use role::Role;
pub use rotation::{
    BreakHour, DEFAULT_BREAK_HOUR, MAX_GROUP_SIZE, RotationEntry, SUPERVISOR_BREAK_HOUR,
    StoredRotation, YearMonth,
};
pub use schedule::BreakScheduleEntry;
