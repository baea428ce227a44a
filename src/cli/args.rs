//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// emplocli - Register attendances on an Odoo instance
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the config file (default: <config dir>/emplocli/config.toml)
    #[arg(long, short, global = true, env = "EMPLOCLI_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug details, including every remote call
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Register a check in
    #[command(visible_alias = "in")]
    CheckIn,
    /// Register a check out
    #[command(visible_alias = "out")]
    CheckOut {
        /// Attendance reason ID to attach to the check out
        #[arg(long, short, value_name = "ID")]
        reason: Option<i32>,
    },
    /// List the available reason IDs with a brief description
    #[command(visible_alias = "reasons")]
    ListReasons,
    /// Show whether the user is currently checked in
    Status,
}
