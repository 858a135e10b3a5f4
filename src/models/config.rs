use anyhow::Context;
use chrono::Local;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::key_path::{KeyPath, Scope};

pub const DEFAULT_MAX_SCAN_DEPTH: usize = 2;

/// Options for a single removal run. Built once per target name.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub target_name: String,
    pub thorough: bool,
    pub dry_run: bool,
    pub backup_enabled: bool,
    pub backup_root: PathBuf,
    pub started_at: String,
}

impl RunConfiguration {
    pub fn new(
        target_name: &str,
        thorough: bool,
        dry_run: bool,
        backup_enabled: bool,
        backup_root: PathBuf,
    ) -> anyhow::Result<Self> {
        let target_name = target_name.trim();
        if target_name.is_empty() {
            anyhow::bail!("application name must not be empty");
        }
        Ok(Self {
            target_name: target_name.to_string(),
            thorough,
            dry_run,
            backup_enabled,
            backup_root,
            started_at: Local::now().format("%Y%m%d_%H%M%S").to_string(),
        })
    }

    /// `<backup_root>/<name>_<start timestamp>`; owned by this run only.
    pub fn backup_dir(&self) -> PathBuf {
        let name = self.target_name.replace(['\\', '/', ':'], "_");
        self.backup_root.join(format!("{}_{}", name, self.started_at))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    backup_root: Option<PathBuf>,
    data_roots: Option<Vec<PathBuf>>,
    extra_data_roots: Vec<PathBuf>,
    extra_scan_roots: Vec<String>,
    max_scan_depth: Option<usize>,
}

/// Machine-level settings: where to look and where backups go.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backup_root: PathBuf,
    pub data_roots: Vec<PathBuf>,
    pub scan_roots: Vec<KeyPath>,
    pub max_scan_depth: usize,
}

impl Settings {
    pub const FILENAME: &'static str = "settings.json";

    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("scrub").join(Self::FILENAME))
    }

    /// Loads `path` if given, else the default settings file when present.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => Some(Self::read_file(path)?),
            None => match Self::default_path() {
                Some(path) if path.exists() => Some(Self::read_file(&path)?),
                _ => None,
            },
        };
        Ok(Self::from_file(file.unwrap_or_default()))
    }

    fn read_file(path: &Path) -> anyhow::Result<SettingsFile> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))
    }

    fn from_file(file: SettingsFile) -> Self {
        let backup_root = file.backup_root.unwrap_or_else(default_backup_root);

        let mut data_roots = file.data_roots.unwrap_or_else(well_known_data_roots);
        data_roots.extend(file.extra_data_roots);

        let mut scan_roots = default_scan_roots();
        for raw in &file.extra_scan_roots {
            match raw.parse::<KeyPath>() {
                Ok(key) => scan_roots.push(key),
                Err(e) => log::warn!("skipping scan root {}: {}", raw, e),
            }
        }

        Self {
            backup_root,
            data_roots,
            scan_roots,
            max_scan_depth: file.max_scan_depth.unwrap_or(DEFAULT_MAX_SCAN_DEPTH),
        }
    }
}

fn default_backup_root() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|dir| dir.join("scrub").join("backups"))
        .unwrap_or_else(|| PathBuf::from("backups"))
}

fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Per-user data, shared program data, installation and temp roots.
pub fn well_known_data_roots() -> Vec<PathBuf> {
    let local = dirs_next::data_local_dir().or_else(|| env_path("LOCALAPPDATA"));
    let candidates = [
        dirs_next::data_dir().or_else(|| env_path("APPDATA")),
        local.clone(),
        env_path("ProgramData"),
        env_path("ProgramFiles"),
        env_path("ProgramFiles(x86)"),
        local.map(|dir| dir.join("Temp")),
        env_path("SystemRoot").map(|dir| dir.join("Temp")),
    ];

    let mut roots: Vec<PathBuf> = Vec::new();
    for root in candidates.into_iter().flatten() {
        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    roots
}

/// Software roots under both scopes plus their `Classes` branches.
pub fn default_scan_roots() -> Vec<KeyPath> {
    vec![
        KeyPath::new(Scope::CurrentUser, "Software"),
        KeyPath::new(Scope::LocalMachine, "Software"),
        KeyPath::new(Scope::CurrentUser, r"Software\Classes"),
        KeyPath::new(Scope::LocalMachine, r"Software\Classes"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_target_is_rejected() {
        assert!(RunConfiguration::new("  ", false, false, true, PathBuf::from("b")).is_err());
    }

    #[test]
    fn test_backup_dir_layout() {
        let config =
            RunConfiguration::new("Foo/Bar", false, true, true, PathBuf::from("backups")).unwrap();
        let dir = config.backup_dir();
        assert_eq!(dir.parent(), Some(Path::new("backups")));
        let name = dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Foo_Bar_"));
        assert_eq!(name.len(), "Foo_Bar_".len() + "20240101_120000".len());
    }

    #[test]
    fn test_settings_file_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "backup_root": "/tmp/scrub-backups",
                "data_roots": ["/opt/a"],
                "extra_data_roots": ["/opt/b"],
                "extra_scan_roots": ["HKCU\\Software\\Vendor", "HKU\\.DEFAULT"],
                "max_scan_depth": 3
            }}"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.backup_root, PathBuf::from("/tmp/scrub-backups"));
        assert_eq!(settings.data_roots, vec![PathBuf::from("/opt/a"), PathBuf::from("/opt/b")]);
        assert_eq!(settings.scan_roots.len(), 5);
        assert_eq!(
            settings.scan_roots[4],
            KeyPath::new(Scope::CurrentUser, r"Software\Vendor")
        );
        assert_eq!(settings.max_scan_depth, 3);
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/scrub/settings.json"))).is_err());
    }
}
