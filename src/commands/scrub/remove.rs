use anyhow::Context;
use std::io::{self, BufRead, Write};

use crate::cli::parser::Cli;
use crate::commands::scrub::report;
use crate::models::config::{RunConfiguration, Settings};
use crate::services::backup::BackupManager;
use crate::services::executor::RemovalExecutor;
use crate::services::interrupt;
use crate::services::registry::NativeStore;
use crate::services::uninstaller::ProcessRunner;

pub fn run(cli: &Cli, target_name: &str, settings: &Settings) -> anyhow::Result<()> {
    let backup_root = cli
        .backup_root
        .clone()
        .unwrap_or_else(|| settings.backup_root.clone());
    let config = RunConfiguration::new(target_name, cli.thorough, cli.dry_run, !cli.no_backup, backup_root)?;

    if !config.dry_run && !cli.yes && !confirm(&config)? {
        println!("Aborted.");
        return Ok(());
    }

    log::info!(
        "[{}] starting removal (thorough: {}, dry-run: {}, backup: {})",
        config.target_name,
        config.thorough,
        config.dry_run,
        config.backup_enabled
    );
    if config.backup_enabled && !config.dry_run {
        log::info!("[{}] backups go to {}", config.target_name, config.backup_dir().display());
    }

    let store = NativeStore::new();
    let runner = ProcessRunner::new();
    let mut backup = BackupManager::new(&store, config.backup_dir(), config.backup_enabled, config.dry_run);
    let report = RemovalExecutor::new(&config, settings, &store, &mut backup, &runner, interrupt::flag())
        .uninstall();

    report::print(&report, cli.json)
}

fn confirm(config: &RunConfiguration) -> anyhow::Result<bool> {
    let mut stdout = io::stdout();
    write!(
        stdout,
        "Remove every trace of '{}'{}? [y/N] ",
        config.target_name,
        if config.backup_enabled { "" } else { " without backup" }
    )?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
