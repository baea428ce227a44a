//! Remote API client for the attendance backend.
//!
//! - [`transport`] - XML-RPC proxies, one per backend endpoint
//! - [`AttendanceClient`] - authentication, state queries and attendance mutations

mod client;
mod error;
#[cfg(test)]
pub(crate) mod testing;
pub mod transport;

pub use client::{AttendanceClient, CheckOut, Outcome, ReasonOutcome, Session};
pub use error::{ApiError, TransportError};
