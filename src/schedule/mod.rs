pub mod events;
pub mod generator;
pub mod rotation;
pub mod service;

use crate::model::{EmployeeId, SupervisorAssignment};

/// Operators assigned to one supervisor, in roster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakGroup {
    pub supervisor_id: EmployeeId,
    pub operator_ids: Vec<EmployeeId>,
}

/// Groups keep the order in which their supervisor first appears in `assignments`.
pub fn group_by_supervisor<'a>(
    assignments: impl IntoIterator<Item = &'a SupervisorAssignment>,
) -> Vec<BreakGroup> {
    let mut groups: Vec<BreakGroup> = Vec::new();
    for assignment in assignments {
        match groups
            .iter_mut()
            .find(|g| g.supervisor_id == assignment.supervisor_id)
        {
            Some(group) => group.operator_ids.push(assignment.operator_id),
            None => groups.push(BreakGroup {
                supervisor_id: assignment.supervisor_id,
                operator_ids: vec![assignment.operator_id],
            }),
        }
    }
    groups
}
