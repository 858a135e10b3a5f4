use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::models::key_path::{KeyPath, Scope};
use crate::models::registration::{FileSystemCandidate, FileSystemMatches, RegistrationEntry};
use crate::services::store::ResourceStore;
use crate::utils::matcher::Matcher;

pub const UNINSTALL_PATHS: [&str; 2] = [
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
    r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
];

const REGISTRATION_SCOPES: [Scope; 2] = [Scope::CurrentUser, Scope::LocalMachine];

/// Every uninstall-registration key, in lookup order.
pub fn uninstall_roots() -> Vec<KeyPath> {
    REGISTRATION_SCOPES
        .iter()
        .flat_map(|scope| UNINSTALL_PATHS.iter().map(|path| KeyPath::new(*scope, path)))
        .collect()
}

pub struct Locator<'a> {
    store: &'a dyn ResourceStore,
    data_roots: &'a [PathBuf],
}

impl<'a> Locator<'a> {
    pub fn new(store: &'a dyn ResourceStore, data_roots: &'a [PathBuf]) -> Self {
        Self { store, data_roots }
    }

    /// Registration entries whose `DisplayName` contains the target.
    pub fn find_registration_entries(&self, matcher: &Matcher) -> Vec<RegistrationEntry> {
        let mut entries = Vec::new();
        for root in uninstall_roots() {
            self.visit_registrations(&root, |entry_key, display_name| {
                if matcher.matches(&display_name) {
                    log::debug!("[{}] matched {}", matcher.target(), display_name);
                    entries.push(self.read_entry(entry_key, display_name));
                }
            });
        }
        entries
    }

    /// All registered applications, minus Windows updates, de-duplicated by
    /// display name and sorted case-insensitively.
    pub fn installed_applications(&self) -> Vec<RegistrationEntry> {
        let mut seen = HashSet::new();
        let mut apps = Vec::new();
        for root in uninstall_roots() {
            self.visit_registrations(&root, |entry_key, display_name| {
                if is_system_update(&display_name) || !seen.insert(display_name.clone()) {
                    return;
                }
                apps.push(self.read_entry(entry_key, display_name));
            });
        }
        apps.sort_by_key(|app| app.display_name.to_lowercase());
        apps
    }

    fn visit_registrations<F>(&self, root: &KeyPath, mut visit: F)
    where
        F: FnMut(KeyPath, String),
    {
        let children = match self.store.enumerate_children(root) {
            Ok(children) => children,
            Err(e) => {
                log::debug!("[{}] not scanned: {}", root, e);
                return;
            }
        };
        for child in children {
            let key = root.child(&child);
            match self.store.read_value(&key, "DisplayName") {
                Ok(Some(name)) if !name.trim().is_empty() => visit(key, name),
                Ok(_) => {}
                Err(e) => log::debug!("[{}] unreadable: {}", key, e),
            }
        }
    }

    fn read_entry(&self, key: KeyPath, display_name: String) -> RegistrationEntry {
        let value = |name: &str| {
            self.store
                .read_value(&key, name)
                .ok()
                .flatten()
                .filter(|v| !v.trim().is_empty())
        };
        RegistrationEntry {
            uninstall_command: value("UninstallString"),
            install_location: value("InstallLocation"),
            publisher: value("Publisher"),
            version: value("DisplayVersion"),
            display_name,
            key_path: key,
        }
    }

    /// Directories directly below each data root whose name matches, plus
    /// (when `include_files`) matching files anywhere below the roots.
    ///
    /// Files inside a matched directory are not reported separately; they go
    /// away with the directory. Data roots may nest (`%LOCALAPPDATA%` and its
    /// `Temp`), so every path is reported once and never below another
    /// reported path.
    pub fn find_file_system_candidates(&self, matcher: &Matcher, include_files: bool) -> FileSystemMatches {
        let roots: Vec<&PathBuf> = self.data_roots.iter().filter(|root| root.is_dir()).collect();

        let mut matches = FileSystemMatches::default();
        let directories = roots.iter().flat_map(|root| find_directories(root, matcher));
        matches.directories = prune_nested(directories);

        if include_files {
            let walk_roots = roots
                .iter()
                .filter(|root| !roots.iter().any(|other| other != *root && root.starts_with(other)));
            let files = walk_roots.flat_map(|root| find_files(root, matcher, &matches.directories));
            matches.files = prune_nested(files);
        }
        matches
    }
}

/// Drops candidates equal to or below an already kept one.
fn prune_nested<I>(candidates: I) -> Vec<FileSystemCandidate>
where
    I: IntoIterator<Item = FileSystemCandidate>,
{
    let mut kept: Vec<FileSystemCandidate> = Vec::new();
    for candidate in candidates {
        if kept.iter().any(|k| candidate.path.starts_with(&k.path)) {
            continue;
        }
        kept.retain(|k| !k.path.starts_with(&candidate.path));
        kept.push(candidate);
    }
    kept
}

fn find_directories(root: &Path, matcher: &Matcher) -> Vec<FileSystemCandidate> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("[{}] not listed: {}", root.display(), e);
            return Vec::new();
        }
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| matcher.matches(&entry.file_name().to_string_lossy()))
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| FileSystemCandidate::directory(entry.path()))
        .collect()
}

fn find_files(root: &Path, matcher: &Matcher, claimed: &[FileSystemCandidate]) -> Vec<FileSystemCandidate> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !claimed.iter().any(|dir| dir.path == entry.path()))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| matcher.matches(&entry.file_name().to_string_lossy()))
        .map(|entry| FileSystemCandidate::file(entry.into_path()))
        .collect()
}

fn is_system_update(display_name: &str) -> bool {
    let kb_update = display_name.contains("KB")
        && ["Update", "Security Update", "Hotfix"]
            .iter()
            .any(|marker| display_name.contains(marker));
    kb_update || display_name.contains("Security Update for") || display_name.contains("Update for")
}
