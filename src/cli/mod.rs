//! cli
//!
//! Command-line interface layer for forgekit.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration once and hand it to handlers
//! - Print exactly one JSON document on stdout and map failures to exit 1

pub mod args;
pub mod commands;

pub use args::Cli;

use std::process::ExitCode;

use anyhow::Result;
use log::error;
use serde_json::Value;

use crate::core::config::Config;
use crate::ui::output::{self, Verbosity};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> ExitCode {
    let cli = Cli::parse_args();
    output::init_logger(Verbosity::from_flags(cli.quiet, cli.debug));

    match execute(cli) {
        Ok(value) => match output::print_json(&value) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!("{:#}", e);
            // stdout may already be gone; the exit code still reports failure
            let _ = output::print_json(&output::error_document(&e));
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<Value> {
    let config = Config::load(cli.config.as_deref())?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(commands::dispatch(cli.command, &config))
}
