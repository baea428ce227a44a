//! CLI command handlers.
//!
//! Loads the config, logs in, runs the requested action and renders its
//! outcome. Failures of the remote steps are printed for the operator and
//! turned into a failing exit status rather than propagated.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use color_eyre::eyre::{Result, WrapErr};
use tracing::{error, warn};

use super::args::Commands;
use crate::api::transport::Transport;
use crate::api::{ApiError, AttendanceClient, CheckOut, Outcome, ReasonOutcome, Session};
use crate::config::{self, Config, Loaded};
use crate::constants;
use crate::state::{self, AttendanceRecord, Reason};

/// Timestamp layout used in user-facing messages.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Resolves the config path from `--config` or the platform default.
///
/// # Errors
///
/// Fails if no path was given and the platform has no config directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(config::default_path()?),
    }
}

/// Runs `command` against the backend named in the config at `config_path`.
///
/// The legacy config location is only considered for the default path.
///
/// # Errors
///
/// Fails if the config cannot be prepared or the backend address is invalid.
pub fn run(command: Commands, config_path: &Path, use_default_path: bool) -> Result<ExitCode> {
    let legacy = if use_default_path {
        config::legacy_path()
    } else {
        None
    };

    let config = match config::load_or_bootstrap(config_path, legacy.as_deref())
        .wrap_err("Failed to load configuration")?
    {
        Loaded::Ready(config) => config,
        Loaded::Bootstrapped(path) => {
            println!("{}{}", constants::CLI_MSG_CONFIG_CREATED, path.display());
            println!("{}", constants::CLI_MSG_CONFIG_EDIT);
            return Ok(ExitCode::FAILURE);
        }
    };
    if config.is_template() {
        println!(
            "{}{}",
            constants::CLI_MSG_CONFIG_TEMPLATE,
            config_path.display()
        );
        println!("{}", constants::CLI_MSG_CONFIG_EDIT);
        return Ok(ExitCode::FAILURE);
    }

    let client = AttendanceClient::with_timeout(&config.url, config.timeout())
        .wrap_err_with(|| format!("Invalid configuration in {}", config_path.display()))?;

    let stdout = io::stdout();
    let succeeded = execute(&client, &config, command, &mut stdout.lock())?;
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Logs in and runs `command`, writing user-facing output to `out`.
///
/// Returns whether the command succeeded; a no-op counts as success.
///
/// # Errors
///
/// Only fails if writing to `out` fails.
pub fn execute<T: Transport, W: Write>(
    client: &AttendanceClient<T>,
    config: &Config,
    command: Commands,
    out: &mut W,
) -> io::Result<bool> {
    let session = match client.authenticate(&config.db, &config.username, &config.password) {
        Ok(Some(session)) => session,
        Ok(None) => {
            writeln!(out, "{}", constants::CLI_MSG_LOGIN_FAILED)?;
            return Ok(false);
        }
        Err(e) => return report(out, &e),
    };

    match command {
        Commands::CheckIn => check_in(client, &session, &config.username, out),
        Commands::CheckOut { reason } => check_out(client, &session, &config.username, reason, out),
        Commands::ListReasons => list_reasons(client, &session, out),
        Commands::Status => status(client, &session, &config.username, out),
    }
}

fn check_in<T: Transport, W: Write>(
    client: &AttendanceClient<T>,
    session: &Session,
    username: &str,
    out: &mut W,
) -> io::Result<bool> {
    match client.check_in(session) {
        Ok(Outcome::Unchanged(_)) => {
            writeln!(out, "{}", constants::CLI_MSG_ALREADY_IN)?;
            Ok(true)
        }
        Ok(Outcome::Done(attendance)) => {
            writeln!(
                out,
                "Checked in as user \"{username}\"{}.",
                at(attendance.check_in)
            )?;
            Ok(true)
        }
        Err(e) => report(out, &e),
    }
}

fn check_out<T: Transport, W: Write>(
    client: &AttendanceClient<T>,
    session: &Session,
    username: &str,
    reason: Option<i32>,
    out: &mut W,
) -> io::Result<bool> {
    match client.check_out(session, reason) {
        Ok(Outcome::Unchanged(_)) => {
            writeln!(out, "{}", constants::CLI_MSG_ALREADY_OUT)?;
            Ok(true)
        }
        Ok(Outcome::Done(CheckOut { attendance, reason })) => {
            writeln!(out, "{}", checked_out_message(username, &attendance))?;
            match reason {
                None => Ok(true),
                Some(ReasonOutcome::Set(_)) => {
                    writeln!(out, "{}", constants::CLI_MSG_REASON_SET)?;
                    Ok(true)
                }
                Some(ReasonOutcome::Rejected(_)) => {
                    writeln!(out, "{}", constants::CLI_MSG_REASON_NOT_SET)?;
                    Ok(false)
                }
                Some(ReasonOutcome::Failed(e)) => report(out, &e),
            }
        }
        Err(e) => report(out, &e),
    }
}

fn list_reasons<T: Transport, W: Write>(
    client: &AttendanceClient<T>,
    session: &Session,
    out: &mut W,
) -> io::Result<bool> {
    match client.list_reasons(session) {
        Ok(reasons) => {
            write!(out, "{}", render_reasons(&reasons))?;
            Ok(true)
        }
        Err(e) => report(out, &e),
    }
}

fn status<T: Transport, W: Write>(
    client: &AttendanceClient<T>,
    session: &Session,
    username: &str,
    out: &mut W,
) -> io::Result<bool> {
    match client.attendance_state(session) {
        Ok(status) => {
            writeln!(
                out,
                "User \"{username}\" (employee {}) is {}.",
                status.employee_id, status.state
            )?;
            Ok(true)
        }
        Err(e) => report(out, &e),
    }
}

fn checked_out_message(username: &str, attendance: &AttendanceRecord) -> String {
    format!(
        "Checked out as user \"{username}\"{}.",
        at(attendance.check_out)
    )
}

/// `" on <local time>"`, or nothing when the backend sent no timestamp.
fn at(timestamp: Option<chrono::NaiveDateTime>) -> String {
    timestamp.map_or_else(String::new, |ts| {
        format!(" on {}", state::to_local(ts).format(DISPLAY_FORMAT))
    })
}

/// Reason catalog as an `ID\tName` table, underlined to the widest entry.
fn render_reasons(reasons: &[Reason]) -> String {
    if reasons.is_empty() {
        return format!("{}\n", constants::CLI_MSG_NO_REASONS);
    }

    let id_width = reasons
        .iter()
        .map(|reason| reason.id.to_string().len())
        .max()
        .unwrap_or_default();
    let name_width = reasons
        .iter()
        .map(|reason| reason.name.chars().count())
        .max()
        .unwrap_or_default();

    let mut table = String::new();
    let _ = writeln!(table, "{}", constants::CLI_MSG_REASONS_HEADER);
    let _ = writeln!(table, "ID\tName");
    let _ = writeln!(table, "{}\t{}", "=".repeat(id_width), "=".repeat(name_width));
    for reason in reasons {
        let _ = writeln!(table, "{}\t{}", reason.id, reason.name);
    }
    table
}

/// Prints `err` for the operator and marks the command as failed.
fn report<W: Write>(out: &mut W, err: &ApiError) -> io::Result<bool> {
    match err {
        ApiError::UnknownReason(_) | ApiError::UnexpectedState(_) => warn!(error = %err),
        _ => error!(error = %err),
    }

    writeln!(out, "{}{err}", constants::CLI_MSG_ERROR)?;
    if matches!(err, ApiError::UnknownReason(_)) {
        writeln!(out, "{}", constants::CLI_MSG_REASON_HINT)?;
    }
    Ok(false)
}
