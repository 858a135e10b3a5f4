use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::models::key_path::KeyPath;
use crate::models::report::{BackupRecord, BackupSource};
use crate::services::store::ResourceStore;

/// Snapshots a resource before it is mutated. A failed snapshot is reported
/// in the returned record and never stops the caller.
pub trait Backup {
    fn backup_key(&mut self, key: &KeyPath) -> BackupRecord;
    fn backup_path(&mut self, path: &Path) -> BackupRecord;
}

pub struct BackupManager<'a> {
    store: &'a dyn ResourceStore,
    backup_dir: PathBuf,
    enabled: bool,
    dry_run: bool,
}

impl<'a> BackupManager<'a> {
    pub fn new(store: &'a dyn ResourceStore, backup_dir: PathBuf, enabled: bool, dry_run: bool) -> Self {
        Self {
            store,
            backup_dir,
            enabled,
            dry_run,
        }
    }

    pub fn key_destination(&self, key: &KeyPath) -> PathBuf {
        self.backup_dir
            .join("registry")
            .join(format!("{}.export", key.sanitized()))
    }

    /// Mirrors `path` below `files/`, dropping its drive or root prefix.
    pub fn path_destination(&self, path: &Path) -> PathBuf {
        let relative: PathBuf = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();
        self.backup_dir.join("files").join(relative)
    }

    fn export_key(&self, key: &KeyPath, dest: &Path) -> Result<()> {
        ensure_parent(dest)?;
        self.store
            .export_subtree(key, dest)
            .with_context(|| format!("export of {} failed", key))
    }
}

impl Backup for BackupManager<'_> {
    fn backup_key(&mut self, key: &KeyPath) -> BackupRecord {
        let source = BackupSource::Key(key.to_string());
        if !self.enabled {
            return BackupRecord::skipped(source);
        }

        let dest = self.key_destination(key);
        if self.dry_run {
            log::info!("dry-run: would back up {} to {}", key, dest.display());
            return BackupRecord {
                source,
                backup_path: Some(dest),
                succeeded: true,
            };
        }

        let succeeded = match self.export_key(key, &dest) {
            Ok(()) => {
                log::info!("[{}] backed up to {}", key, dest.display());
                true
            }
            Err(e) => {
                log::warn!("[{}] backup failed: {:#}", key, e);
                false
            }
        };
        BackupRecord {
            source,
            backup_path: Some(dest),
            succeeded,
        }
    }

    fn backup_path(&mut self, path: &Path) -> BackupRecord {
        let source = BackupSource::Path(path.to_path_buf());
        if !self.enabled || !path.exists() {
            return BackupRecord::skipped(source);
        }

        let dest = self.path_destination(path);
        if self.dry_run {
            log::info!("dry-run: would back up {} to {}", path.display(), dest.display());
            return BackupRecord {
                source,
                backup_path: Some(dest),
                succeeded: true,
            };
        }

        let result = if path.is_dir() {
            copy_tree(path, &dest)
        } else {
            copy_file(path, &dest)
        };
        let succeeded = match result {
            Ok(files) => {
                log::info!("[{}] backed up {} file(s) to {}", path.display(), files, dest.display());
                true
            }
            Err(e) => {
                log::warn!("[{}] backup failed: {:#}", path.display(), e);
                false
            }
        };
        BackupRecord {
            source,
            backup_path: Some(dest),
            succeeded,
        }
    }
}

fn ensure_parent(dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create backup directory {}", parent.display()))?;
    }
    Ok(())
}

fn copy_file(src: &Path, dest: &Path) -> Result<u64> {
    ensure_parent(dest)?;
    fs::copy(src, dest).with_context(|| format!("Failed to copy {}", src.display()))?;
    Ok(1)
}

fn copy_tree(src: &Path, dest: &Path) -> Result<u64> {
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else if entry.file_type().is_file() {
            copied += copy_file(entry.path(), &target)?;
        } else {
            log::debug!("[{}] skip non-regular entry", entry.path().display());
        }
    }
    Ok(copied)
}
