//! Native registry access.
//!
//! On Windows the store is backed by `winreg`; subtree export shells out to
//! `reg export`, which writes the standard `.reg` text format that
//! `reg import` can restore. Other platforms get a store that refuses every
//! call, so the binary still builds there and fails at the platform check.

use std::path::Path;

use crate::models::key_path::KeyPath;
use crate::services::store::{ResourceStore, StoreError, StoreResult};

#[cfg(windows)]
pub type NativeStore = WindowsRegistry;
#[cfg(not(windows))]
pub type NativeStore = UnsupportedStore;

#[cfg(windows)]
#[derive(Debug, Default)]
pub struct WindowsRegistry;

#[cfg(windows)]
impl WindowsRegistry {
    pub fn new() -> Self {
        Self
    }

    fn open(&self, key: &KeyPath) -> StoreResult<winreg::RegKey> {
        use winreg::enums::KEY_READ;
        predef(key)
            .open_subkey_with_flags(key.subpath(), KEY_READ)
            .map_err(|e| StoreError::from_io(key, e))
    }
}

#[cfg(windows)]
fn predef(key: &KeyPath) -> winreg::RegKey {
    use crate::models::key_path::Scope;
    use winreg::enums::{HKEY_CLASSES_ROOT, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};
    let hkey = match key.scope {
        Scope::CurrentUser => HKEY_CURRENT_USER,
        Scope::LocalMachine => HKEY_LOCAL_MACHINE,
        Scope::ClassesRoot => HKEY_CLASSES_ROOT,
    };
    winreg::RegKey::predef(hkey)
}

#[cfg(windows)]
impl ResourceStore for WindowsRegistry {
    fn enumerate_children(&self, key: &KeyPath) -> StoreResult<Vec<String>> {
        let handle = self.open(key)?;
        let mut names = Vec::new();
        for name in handle.enum_keys() {
            match name {
                Ok(name) => names.push(name),
                Err(e) => log::debug!("[{}] skip unreadable subkey: {}", key, e),
            }
        }
        Ok(names)
    }

    fn read_value(&self, key: &KeyPath, name: &str) -> StoreResult<Option<String>> {
        use std::io::ErrorKind;
        let handle = self.open(key)?;
        match handle.get_value::<String, _>(name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::InvalidData) => Ok(None),
            Err(e) => Err(StoreError::from_io(key, e)),
        }
    }

    fn export_subtree(&self, key: &KeyPath, destination: &Path) -> StoreResult<()> {
        use std::process::Command;
        let output = Command::new("reg")
            .arg("export")
            .arg(key.to_string())
            .arg(destination)
            .arg("/y")
            .output()
            .map_err(|e| StoreError::from_io(key, e))?;
        if !output.status.success() {
            return Err(StoreError::ExportFailed {
                key: key.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn delete_subtree(&self, key: &KeyPath) -> StoreResult<()> {
        if key.segments.is_empty() {
            return Err(StoreError::AccessDenied(key.to_string()));
        }
        predef(key)
            .delete_subkey_all(key.subpath())
            .map_err(|e| StoreError::from_io(key, e))
    }
}

#[cfg(not(windows))]
#[derive(Debug, Default)]
pub struct UnsupportedStore;

#[cfg(not(windows))]
impl UnsupportedStore {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(windows))]
impl ResourceStore for UnsupportedStore {
    fn enumerate_children(&self, _key: &KeyPath) -> StoreResult<Vec<String>> {
        Err(StoreError::Unsupported)
    }

    fn read_value(&self, _key: &KeyPath, _name: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Unsupported)
    }

    fn export_subtree(&self, _key: &KeyPath, _destination: &Path) -> StoreResult<()> {
        Err(StoreError::Unsupported)
    }

    fn delete_subtree(&self, _key: &KeyPath) -> StoreResult<()> {
        Err(StoreError::Unsupported)
    }
}
