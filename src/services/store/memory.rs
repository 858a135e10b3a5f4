use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use super::{ResourceStore, StoreError, StoreResult};
use crate::models::key_path::KeyPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Enumerate(KeyPath),
    Read(KeyPath, String),
    Export(KeyPath),
    Delete(KeyPath),
}

/// In-memory store that records every call made against it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: RefCell<BTreeMap<KeyPath, BTreeMap<String, String>>>,
    denied: BTreeSet<KeyPath>,
    failing_deletes: BTreeSet<KeyPath>,
    failing_exports: BTreeSet<KeyPath>,
    calls: RefCell<Vec<StoreCall>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `key` and any missing ancestors.
    pub fn add_key(&mut self, key: &KeyPath) {
        let mut keys = self.keys.borrow_mut();
        for len in 0..=key.segments.len() {
            let ancestor = KeyPath {
                scope: key.scope,
                segments: key.segments[..len].to_vec(),
            };
            keys.entry(ancestor).or_default();
        }
    }

    pub fn set_value(&mut self, key: &KeyPath, name: &str, value: &str) {
        self.add_key(key);
        self.keys
            .borrow_mut()
            .entry(key.clone())
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    pub fn deny(&mut self, key: &KeyPath) {
        self.denied.insert(key.clone());
    }

    pub fn fail_delete(&mut self, key: &KeyPath) {
        self.failing_deletes.insert(key.clone());
    }

    pub fn fail_export(&mut self, key: &KeyPath) {
        self.failing_exports.insert(key.clone());
    }

    pub fn contains(&self, key: &KeyPath) -> bool {
        self.keys.borrow().contains_key(key)
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }

    pub fn enumerations(&self) -> Vec<KeyPath> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                StoreCall::Enumerate(key) => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn deletions(&self) -> Vec<KeyPath> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                StoreCall::Delete(key) => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn mutations(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, StoreCall::Export(_) | StoreCall::Delete(_)))
            .count()
    }

    fn record(&self, call: StoreCall) {
        self.calls.borrow_mut().push(call);
    }

    fn check_access(&self, key: &KeyPath) -> StoreResult<()> {
        if self.denied.contains(key) {
            return Err(StoreError::AccessDenied(key.to_string()));
        }
        if !self.keys.borrow().contains_key(key) {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(())
    }
}

impl ResourceStore for MemoryStore {
    fn enumerate_children(&self, key: &KeyPath) -> StoreResult<Vec<String>> {
        self.record(StoreCall::Enumerate(key.clone()));
        self.check_access(key)?;
        let depth = key.segments.len() + 1;
        Ok(self
            .keys
            .borrow()
            .keys()
            .filter(|k| k.segments.len() == depth && k.is_within(key))
            .filter_map(|k| k.name().map(|s| s.to_string()))
            .collect())
    }

    fn read_value(&self, key: &KeyPath, name: &str) -> StoreResult<Option<String>> {
        self.record(StoreCall::Read(key.clone(), name.to_string()));
        self.check_access(key)?;
        Ok(self
            .keys
            .borrow()
            .get(key)
            .and_then(|values| values.get(name).cloned()))
    }

    fn export_subtree(&self, key: &KeyPath, destination: &Path) -> StoreResult<()> {
        self.record(StoreCall::Export(key.clone()));
        self.check_access(key)?;
        if self.failing_exports.contains(key) {
            return Err(StoreError::ExportFailed {
                key: key.to_string(),
                detail: "export refused".to_string(),
            });
        }
        let keys = self.keys.borrow();
        let mut lines = Vec::new();
        for (k, values) in keys.iter().filter(|(k, _)| k.is_within(key)) {
            lines.push(format!("[{}]", k));
            for (name, value) in values {
                lines.push(format!("\"{}\"=\"{}\"", name, value));
            }
        }
        fs::write(destination, lines.join("\n")).map_err(|e| StoreError::from_io(key, e))
    }

    fn delete_subtree(&self, key: &KeyPath) -> StoreResult<()> {
        self.record(StoreCall::Delete(key.clone()));
        self.check_access(key)?;
        if self.failing_deletes.contains(key) {
            return Err(StoreError::AccessDenied(key.to_string()));
        }
        self.keys
            .borrow_mut()
            .retain(|k, _| !k.is_within(key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::key_path::Scope;

    #[test]
    fn test_children_and_subtree_delete() {
        let mut store = MemoryStore::new();
        let root = KeyPath::new(Scope::CurrentUser, "Software");
        store.add_key(&root.child("A").child("B"));
        store.add_key(&root.child("C"));

        assert_eq!(store.enumerate_children(&root).unwrap(), vec!["A", "C"]);
        store.delete_subtree(&root.child("A")).unwrap();
        assert!(!store.contains(&root.child("A").child("B")));
        assert_eq!(store.enumerate_children(&root).unwrap(), vec!["C"]);
        assert!(matches!(
            store.enumerate_children(&root.child("A")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_missing_value_is_none() {
        let mut store = MemoryStore::new();
        let key = KeyPath::new(Scope::LocalMachine, r"Software\Foo");
        store.set_value(&key, "DisplayName", "Foo");
        assert_eq!(store.read_value(&key, "DisplayName").unwrap().as_deref(), Some("Foo"));
        assert_eq!(store.read_value(&key, "Publisher").unwrap(), None);
    }
}
