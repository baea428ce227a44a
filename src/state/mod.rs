//! Domain types returned by the backend.

mod attendance;
pub mod reason;

pub use attendance::{
    parse_timestamp, to_local, AttendanceRecord, AttendanceState, EmployeeStatus,
};
pub use reason::Reason;
