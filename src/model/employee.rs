use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

pub type EmployeeId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Operador 1",
        "role": "operator"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: EmployeeId,

    #[schema(example = "Operador 1")]
    pub name: String,

    pub role: Role,
}

/// Operator -> supervisor link. One row per operator; reassignment overwrites it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SupervisorAssignment {
    #[schema(example = 2)]
    pub operator_id: EmployeeId,

    #[schema(example = 10)]
    pub supervisor_id: EmployeeId,
}
