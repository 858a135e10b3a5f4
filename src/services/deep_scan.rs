use crate::models::key_path::KeyPath;
use crate::models::report::BackupRecord;
use crate::services::backup::Backup;
use crate::services::store::ResourceStore;
use crate::utils::matcher::Matcher;

/// Depth-bounded walk that deletes subkeys whose own name matches the
/// target. A matched subtree is removed whole and never descended into.
///
/// Scan roots may nest (`Software` and `Software\Classes`). A subtree
/// handled under one root is skipped when another root reaches it again,
/// so a dry run sees the same keys a real run would.
pub struct DeepScanner<'a> {
    store: &'a dyn ResourceStore,
    backup: &'a mut dyn Backup,
    matcher: &'a Matcher,
    dry_run: bool,
    max_depth: usize,
    handled: Vec<KeyPath>,
    backups: Vec<BackupRecord>,
}

impl<'a> DeepScanner<'a> {
    pub fn new(
        store: &'a dyn ResourceStore,
        backup: &'a mut dyn Backup,
        matcher: &'a Matcher,
        dry_run: bool,
        max_depth: usize,
    ) -> Self {
        Self {
            store,
            backup,
            matcher,
            dry_run,
            max_depth,
            handled: Vec::new(),
            backups: Vec::new(),
        }
    }

    /// Backups taken for matched keys, in scan order.
    pub fn into_backups(self) -> Vec<BackupRecord> {
        self.backups
    }

    /// Scans below `root`. The root itself is only a container and is never
    /// a deletion candidate.
    pub fn scan_root(&mut self, root: &KeyPath) -> usize {
        if self.already_handled(root) {
            return 0;
        }
        self.descend(root, 0)
    }

    /// Returns the number of subtrees deleted at or below `key`.
    pub fn scan(&mut self, key: &KeyPath, depth: usize) -> usize {
        if depth > self.max_depth || self.already_handled(key) {
            return 0;
        }

        let matched = key.name().is_some_and(|name| self.matcher.matches(name));
        if matched {
            self.handled.push(key.clone());
            return self.remove(key);
        }
        self.descend(key, depth)
    }

    fn already_handled(&self, key: &KeyPath) -> bool {
        self.handled.iter().any(|done| key.is_within(done))
    }

    fn descend(&mut self, key: &KeyPath, depth: usize) -> usize {
        if depth > self.max_depth {
            return 0;
        }
        let children = match self.store.enumerate_children(key) {
            Ok(children) => children,
            Err(e) => {
                log::debug!("[{}] not scanned: {}", key, e);
                return 0;
            }
        };
        children
            .iter()
            .map(|child| self.scan(&key.child(child), depth + 1))
            .sum()
    }

    fn remove(&mut self, key: &KeyPath) -> usize {
        let record = self.backup.backup_key(key);
        self.backups.push(record);
        if self.dry_run {
            log::info!("dry-run: would delete registry key (deep scan): {}", key);
            return 1;
        }
        match self.store.delete_subtree(key) {
            Ok(()) => {
                log::info!("deleted registry key (deep scan): {}", key);
                1
            }
            Err(e) => {
                log::warn!("[{}] delete failed: {}", key, e);
                0
            }
        }
    }
}
