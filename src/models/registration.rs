use serde::Serialize;
use std::path::PathBuf;

use crate::models::key_path::KeyPath;

/// Uninstall metadata read from one child of an uninstall-registration key.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationEntry {
    pub display_name: String,
    pub key_path: KeyPath,
    pub uninstall_command: Option<String>,
    pub install_location: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum CandidateKind {
    File,
    Directory,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileSystemCandidate {
    pub path: PathBuf,
    pub kind: CandidateKind,
}

impl FileSystemCandidate {
    pub fn directory(path: PathBuf) -> Self {
        Self {
            path,
            kind: CandidateKind::Directory,
        }
    }

    pub fn file(path: PathBuf) -> Self {
        Self {
            path,
            kind: CandidateKind::File,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileSystemMatches {
    pub directories: Vec<FileSystemCandidate>,
    pub files: Vec<FileSystemCandidate>,
}
