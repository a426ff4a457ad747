pub mod attendance;
pub mod breaks;
pub mod employee;
pub mod rotation;
