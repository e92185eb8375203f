//! # todo
//!
//! Command line todo list manager binary: loads settings, sets up logging,
//! opens the task database and runs one subcommand.

#![deny(unsafe_code)]

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap::error::ErrorKind;
use todo::{Cli, TaskNotFound, TodoList};
use todo_settings::{LogLevel, TodoSettings, apply_env_overrides, load_settings};
use todo_store::Database;
use todo_telemetry::{TelemetryConfig, init_telemetry};
use tracing::{Level, debug, warn};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let _ = Cli::command().print_help();
            return ExitCode::SUCCESS;
        }
        Err(err) => err.exit(),
    };

    let (mut settings, settings_err) = match load_settings() {
        Ok(settings) => (settings, None),
        Err(err) => {
            // the file layer is unusable; defaults still take env overrides
            let mut settings = TodoSettings::default();
            apply_env_overrides(&mut settings);
            (settings, Some(err))
        }
    };
    if let Some(path) = &cli.file_path {
        settings.database.path.clone_from(path);
    }

    let _ = init_telemetry(&TelemetryConfig {
        log_level: tracing_level(settings.logging.level),
        module_levels: Vec::new(),
        json: settings.logging.json,
    });
    if let Some(err) = settings_err {
        warn!(error = %err, "settings file not loaded, using defaults and environment");
    }

    match run(&cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.downcast_ref::<TaskNotFound>().is_some() => {
            eprintln!("{err}");
            ExitCode::from(2)
        }
        Err(err) => {
            debug!(error = ?err, "command failed");
            eprintln!("Failed to execute todo command...");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, settings: &TodoSettings) -> Result<()> {
    let path = &settings.database.path;
    let db = Database::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    let todo = TodoList::new(db);
    todo.prepare()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.init {
        todo.initialize(&mut out)?;
    }
    if let Some(command) = &cli.command {
        todo.run(command, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

fn tracing_level(level: LogLevel) -> Level {
    level.as_filter_str().parse().unwrap_or(Level::WARN)
}
