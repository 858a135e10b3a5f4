use serde::Serialize;
use std::fmt::{self, Display};
use std::path::PathBuf;

/// Identity of something that was (or would have been) backed up.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "source", rename_all = "lowercase")]
pub enum BackupSource {
    Key(String),
    Path(PathBuf),
}

impl Display for BackupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{}", key),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupRecord {
    pub source: BackupSource,
    pub backup_path: Option<PathBuf>,
    pub succeeded: bool,
}

impl BackupRecord {
    pub fn skipped(source: BackupSource) -> Self {
        Self {
            source,
            backup_path: None,
            succeeded: true,
        }
    }
}

/// Per-phase counts of one removal run. Only ever incremented.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct OperationCounters {
    pub registry_entries_removed: usize,
    pub directories_removed: usize,
    pub files_removed: usize,
    pub deep_scan_keys_removed: usize,
    pub uninstaller_executed: bool,
}

impl OperationCounters {
    pub fn total_removed(&self) -> usize {
        self.registry_entries_removed
            + self.directories_removed
            + self.files_removed
            + self.deep_scan_keys_removed
    }
}

/// Result record handed to the report renderer.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub target_name: String,
    pub dry_run: bool,
    pub thorough: bool,
    pub backup_enabled: bool,
    pub counters: OperationCounters,
    pub backup_dir: PathBuf,
    pub backups_failed: usize,
    /// Every backup that was written (or, under dry-run, planned).
    pub backups: Vec<BackupRecord>,
    pub cancelled: bool,
}
