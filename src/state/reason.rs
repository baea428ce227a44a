//! Attendance reason catalog entries.

/// An `hr.attendance.reason` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reason {
    /// Record id, as accepted by `check-out --reason`.
    pub id: i32,
    /// Human readable description.
    pub name: String,
}
