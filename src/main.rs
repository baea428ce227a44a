use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use emplocli::cli::args::Args;
use emplocli::cli::commands;
use emplocli::logging;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();
    let config_path = commands::resolve_config_path(args.config.as_deref())?;

    let _guard = logging::init(&logging::log_dir(&config_path), args.verbose);
    tracing::debug!(
        version = emplocli::constants::APP_VERSION,
        command = ?args.command,
        "starting"
    );

    commands::run(args.command, &config_path, args.config.is_none())
}
