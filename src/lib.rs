//! # emplocli
//!
//! Registers attendances (check in / check out) on an Odoo HR backend over
//! XML-RPC, optionally tagging a check out with an attendance reason.
//!
//! ## Modules
//!
//! - [`api`] - Backend client and XML-RPC transport
//! - [`state`] - Attendance and reason types
//! - [`config`] - Config file loading and first-run bootstrap
//! - [`cli`] - Argument parsing and command handlers
//! - [`logging`] - Log file setup

pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod logging;
pub mod state;
