use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use crate::models::config::{RunConfiguration, Settings};
use crate::models::registration::{CandidateKind, FileSystemCandidate, RegistrationEntry};
use crate::models::report::{BackupRecord, OperationCounters, RunReport};
use crate::services::backup::Backup;
use crate::services::deep_scan::DeepScanner;
use crate::services::interrupt;
use crate::services::locator::Locator;
use crate::services::store::ResourceStore;
use crate::services::uninstaller::{CommandRunner, UninstallCommand};
use crate::utils::matcher::Matcher;

/// Runs the six removal phases for one target name.
///
/// Every mutation is preceded by a backup request and skipped under dry-run;
/// a failing item is logged and the loop moves on. Only the interrupt flag
/// ends a run early.
pub struct RemovalExecutor<'a> {
    config: &'a RunConfiguration,
    settings: &'a Settings,
    store: &'a dyn ResourceStore,
    backup: &'a mut dyn Backup,
    runner: &'a dyn CommandRunner,
    interrupt: &'a AtomicBool,
    counters: OperationCounters,
    backups_failed: usize,
    backups: Vec<BackupRecord>,
}

impl<'a> RemovalExecutor<'a> {
    pub fn new(
        config: &'a RunConfiguration,
        settings: &'a Settings,
        store: &'a dyn ResourceStore,
        backup: &'a mut dyn Backup,
        runner: &'a dyn CommandRunner,
        interrupt: &'a AtomicBool,
    ) -> Self {
        Self {
            config,
            settings,
            store,
            backup,
            runner,
            interrupt,
            counters: OperationCounters::default(),
            backups_failed: 0,
            backups: Vec::new(),
        }
    }

    pub fn uninstall(mut self) -> RunReport {
        let cancelled = self.run_phases().is_err();
        if cancelled {
            log::warn!("[{}] cancelled by operator", self.config.target_name);
        }
        self.report(cancelled)
    }

    fn run_phases(&mut self) -> Result<(), Cancelled> {
        let name = self.config.target_name.clone();
        let matcher = Matcher::new(&name);
        let settings = self.settings;
        let locator = Locator::new(self.store, &settings.data_roots);

        log::info!("[{}] searching registry", name);
        let entries = locator.find_registration_entries(&matcher);
        if entries.is_empty() {
            log::warn!("[{}] no uninstall entries found", name);
        } else {
            log::info!("[{}] found {} uninstall entries", name, entries.len());
            self.checkpoint()?;
            self.run_uninstallers(&entries)?;
            self.checkpoint()?;
            self.remove_registrations(&entries)?;
        }

        self.checkpoint()?;
        log::info!("[{}] searching data directories", name);
        let found = locator.find_file_system_candidates(&matcher, self.config.thorough);
        if found.directories.is_empty() {
            log::info!("[{}] no directories found", name);
        } else {
            log::info!("[{}] found {} directories", name, found.directories.len());
            self.remove_paths(&found.directories)?;
        }

        if !self.config.thorough {
            return Ok(());
        }

        self.checkpoint()?;
        if found.files.is_empty() {
            log::info!("[{}] no files found", name);
        } else {
            log::info!("[{}] found {} files", name, found.files.len());
            self.remove_paths(&found.files)?;
        }

        self.checkpoint()?;
        log::info!("[{}] deep registry scan", name);
        self.deep_scan(&matcher)
    }

    fn checkpoint(&self) -> Result<(), Cancelled> {
        if interrupt::is_raised(self.interrupt) {
            return Err(Cancelled);
        }
        Ok(())
    }

    fn run_uninstallers(&mut self, entries: &[RegistrationEntry]) -> Result<(), Cancelled> {
        for entry in entries {
            self.checkpoint()?;
            log::info!("found application: {}", entry.display_name);
            let Some(raw) = entry.uninstall_command.as_deref() else {
                continue;
            };
            let Some(command) = UninstallCommand::parse(raw) else {
                continue;
            };
            let command = command.with_silent_flag();

            if self.config.dry_run {
                log::info!("dry-run: would execute uninstaller: {} {}", command.program, command.args);
                self.counters.uninstaller_executed = true;
                continue;
            }

            log::info!("executing uninstaller: {} {}", command.program, command.args);
            match self.runner.run(&command) {
                Ok(outcome) => {
                    log::info!("[{}] uninstaller exit code: {:?}", entry.display_name, outcome.code);
                    if !outcome.stdout.trim().is_empty() {
                        log::debug!("[{}] uninstaller output: {}", entry.display_name, outcome.stdout.trim());
                    }
                    if !outcome.stderr.trim().is_empty() {
                        log::warn!("[{}] uninstaller error: {}", entry.display_name, outcome.stderr.trim());
                    }
                    if outcome.success() {
                        self.counters.uninstaller_executed = true;
                    } else {
                        log::warn!("[{}] uninstaller did not succeed", entry.display_name);
                    }
                }
                Err(e) => log::warn!("[{}] failed to run uninstaller: {}", entry.display_name, e),
            }
        }
        Ok(())
    }

    fn remove_registrations(&mut self, entries: &[RegistrationEntry]) -> Result<(), Cancelled> {
        for entry in entries {
            self.checkpoint()?;
            let key = &entry.key_path;
            let record = self.backup.backup_key(key);
            self.track_backup(record);

            if self.config.dry_run {
                log::info!("dry-run: would delete registry key: {}", key);
                self.counters.registry_entries_removed += 1;
                continue;
            }

            match self.store.delete_subtree(key) {
                Ok(()) => {
                    log::info!("deleted registry key: {}", key);
                    self.counters.registry_entries_removed += 1;
                }
                Err(e) => log::warn!("[{}] delete failed: {}", key, e),
            }
        }
        Ok(())
    }

    fn remove_paths(&mut self, candidates: &[FileSystemCandidate]) -> Result<(), Cancelled> {
        for candidate in candidates {
            self.checkpoint()?;
            let path = candidate.path.as_path();
            if !path.exists() {
                log::debug!("[{}] already gone", path.display());
                continue;
            }
            let record = self.backup.backup_path(path);
            self.track_backup(record);

            if self.config.dry_run {
                log::info!("dry-run: would remove {:?}: {}", candidate.kind, path.display());
                self.count_removed(candidate);
                continue;
            }

            match remove_path(path) {
                Ok(()) => {
                    log::info!("removed {:?}: {}", candidate.kind, path.display());
                    self.count_removed(candidate);
                }
                Err(e) => log::warn!("[{}] remove failed: {}", path.display(), e),
            }
        }
        Ok(())
    }

    fn track_backup(&mut self, record: BackupRecord) {
        if !record.succeeded {
            self.backups_failed += 1;
        }
        if record.backup_path.is_some() {
            self.backups.push(record);
        }
    }

    fn count_removed(&mut self, candidate: &FileSystemCandidate) {
        match candidate.kind {
            CandidateKind::Directory => self.counters.directories_removed += 1,
            CandidateKind::File => self.counters.files_removed += 1,
        }
    }

    fn deep_scan(&mut self, matcher: &Matcher) -> Result<(), Cancelled> {
        let settings = self.settings;
        let interrupt = self.interrupt;
        let mut scanner = DeepScanner::new(
            self.store,
            &mut *self.backup,
            matcher,
            self.config.dry_run,
            settings.max_scan_depth,
        );
        let mut removed = 0;
        let mut result = Ok(());
        for root in &settings.scan_roots {
            if interrupt::is_raised(interrupt) {
                result = Err(Cancelled);
                break;
            }
            removed += scanner.scan_root(root);
        }

        let backups = scanner.into_backups();

        self.counters.deep_scan_keys_removed += removed;
        for record in backups {
            self.track_backup(record);
        }
        result
    }

    fn report(self, cancelled: bool) -> RunReport {
        RunReport {
            target_name: self.config.target_name.clone(),
            dry_run: self.config.dry_run,
            thorough: self.config.thorough,
            backup_enabled: self.config.backup_enabled,
            counters: self.counters,
            backup_dir: self.config.backup_dir(),
            backups_failed: self.backups_failed,
            backups: self.backups,
            cancelled,
        }
    }
}

#[derive(Debug)]
struct Cancelled;

fn remove_path(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
