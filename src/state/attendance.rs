//! Attendance state types.
//!
//! The backend toggles an employee between two states; every query returns a
//! fresh [`EmployeeStatus`] and nothing here is cached between calls.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::str::FromStr;

use crate::constants;

/// Presence state of an employee as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceState {
    /// An attendance is open.
    CheckedIn,
    /// No open attendance.
    CheckedOut,
}

impl AttendanceState {
    /// Wire value of the `attendance_state` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
        }
    }
}

impl FromStr for AttendanceState {
    /// The unrecognised wire value.
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checked_in" => Ok(Self::CheckedIn),
            "checked_out" => Ok(Self::CheckedOut),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for AttendanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CheckedIn => write!(f, "checked in"),
            Self::CheckedOut => write!(f, "checked out"),
        }
    }
}

/// The employee linked to the session user, with its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeStatus {
    /// `hr.employee` record id.
    pub employee_id: i32,
    /// Current presence state.
    pub state: AttendanceState,
}

/// An attendance row created or closed by "register attendance".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    /// `hr.attendance` record id.
    pub id: i32,
    /// Check-in time (UTC).
    pub check_in: Option<NaiveDateTime>,
    /// Check-out time (UTC), absent while the attendance is open.
    pub check_out: Option<NaiveDateTime>,
}

/// Parses a backend datetime (`YYYY-MM-DD HH:MM:SS`, UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), constants::BACKEND_DATETIME_FORMAT).ok()
}

/// Converts a backend UTC timestamp to local time for display.
#[must_use]
pub fn to_local(timestamp: NaiveDateTime) -> DateTime<Local> {
    Utc.from_utc_datetime(&timestamp).with_timezone(&Local)
}
