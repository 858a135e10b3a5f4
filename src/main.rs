mod cli;
mod commands;
mod logging;
mod models;
mod services;
mod utils;

use crate::cli::parser::Cli;
use crate::logging::init::{init_logging, level_for};
use crate::models::config::Settings;
use crate::services::interrupt;
use crate::services::registry::NativeStore;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(level_for(&cli), cli.log_file.as_deref()) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    if !cfg!(windows) {
        log::error!("scrub only runs on Windows");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.list_only {
        commands::scrub::list::run(&NativeStore::new());
        return Ok(());
    }

    let Some(target_name) = cli.target_name() else {
        anyhow::bail!("no application name given (use --list-only to see installed applications)");
    };

    interrupt::install()?;
    let settings = Settings::load(cli.settings.as_deref())?;
    log::debug!("data roots: {:?}", settings.data_roots);
    commands::scrub::remove::run(cli, target_name, &settings)
}
