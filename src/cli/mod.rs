//! Command-line front end: argument definitions and the handlers that turn
//! client outcomes into console output and exit codes.

pub mod args;
pub mod commands;
