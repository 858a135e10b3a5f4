use serde::Serialize;
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::services::store::StoreError;

/// Root partition of the hierarchical configuration store.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    CurrentUser,
    LocalMachine,
    ClassesRoot,
}

impl Scope {
    pub fn hive_name(&self) -> &'static str {
        match self {
            Self::CurrentUser => "HKEY_CURRENT_USER",
            Self::LocalMachine => "HKEY_LOCAL_MACHINE",
            Self::ClassesRoot => "HKEY_CLASSES_ROOT",
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hive_name())
    }
}

impl FromStr for Scope {
    type Err = StoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HKEY_CURRENT_USER" | "HKCU" => Ok(Self::CurrentUser),
            "HKEY_LOCAL_MACHINE" | "HKLM" => Ok(Self::LocalMachine),
            "HKEY_CLASSES_ROOT" | "HKCR" => Ok(Self::ClassesRoot),
            _ => Err(StoreError::MalformedKeyPath(s.to_string())),
        }
    }
}

/// A scoped key path, built once at discovery time and threaded through
/// backup and deletion unchanged.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath {
    pub scope: Scope,
    pub segments: Vec<String>,
}

impl KeyPath {
    pub fn new(scope: Scope, path: &str) -> Self {
        let segments = path
            .split(['\\', '/'])
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        Self { scope, segments }
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self {
            scope: self.scope,
            segments,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    /// Path below the scope root, joined with backslashes.
    pub fn subpath(&self) -> String {
        self.segments.join("\\")
    }

    /// True when `self` is `ancestor` or lies anywhere below it.
    pub fn is_within(&self, ancestor: &KeyPath) -> bool {
        self.scope == ancestor.scope && self.segments.starts_with(&ancestor.segments)
    }

    /// Full key path with every separator replaced, usable as a file name.
    pub fn sanitized(&self) -> String {
        self.to_string().replace(['\\', '/'], "_")
    }
}

impl Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "{}", self.scope)
        } else {
            write!(f, "{}\\{}", self.scope, self.subpath())
        }
    }
}

impl FromStr for KeyPath {
    type Err = StoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches(['\\', '/']);
        let (root, rest) = match trimmed.split_once(['\\', '/']) {
            Some((root, rest)) => (root, rest),
            None => (trimmed, ""),
        };
        let scope = root.parse::<Scope>()?;
        Ok(Self::new(scope, rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_hive_names() {
        let key: KeyPath = r"HKEY_CURRENT_USER\Software\Foo".parse().unwrap();
        assert_eq!(key.scope, Scope::CurrentUser);
        assert_eq!(key.segments, vec!["Software", "Foo"]);

        let key: KeyPath = r"hklm\SOFTWARE\Classes".parse().unwrap();
        assert_eq!(key.scope, Scope::LocalMachine);
        assert_eq!(key.name(), Some("Classes"));
    }

    #[test]
    fn test_unknown_scope_is_rejected() {
        let err = r"HKEY_USERS\S-1-5-18\Software".parse::<KeyPath>().unwrap_err();
        assert!(matches!(err, StoreError::MalformedKeyPath(ref s) if s == "HKEY_USERS"));
        assert!("".parse::<KeyPath>().is_err());
    }

    #[test]
    fn test_is_within() {
        let software = KeyPath::new(Scope::CurrentUser, "Software");
        let classes = software.child("Classes");
        assert!(classes.is_within(&software));
        assert!(classes.is_within(&classes));
        assert!(!software.is_within(&classes));
        assert!(!KeyPath::new(Scope::LocalMachine, r"Software\Classes").is_within(&software));
        assert!(!KeyPath::new(Scope::CurrentUser, "SoftwareX").is_within(&software));
    }

    #[test]
    fn test_display_and_sanitized() {
        let key = KeyPath::new(Scope::LocalMachine, r"SOFTWARE\Vendor/App").child("{GUID}");
        assert_eq!(key.to_string(), r"HKEY_LOCAL_MACHINE\SOFTWARE\Vendor\App\{GUID}");
        assert_eq!(key.sanitized(), "HKEY_LOCAL_MACHINE_SOFTWARE_Vendor_App_{GUID}");
        assert_eq!(key.subpath(), r"SOFTWARE\Vendor\App\{GUID}");
    }
}
