//! On-disk state of a local target

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a path on the local filesystem
///
/// Captures the metadata the staleness check needs: existence, byte size
/// and modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemState {
    /// Whether anything exists at the path
    pub exists: bool,
    /// Whether this is a regular file (false for directories and other types)
    pub is_file: bool,
    /// Size in bytes (0 for directories or non-existent files)
    pub size: u64,
    /// Last modification time (None if not available or file doesn't exist)
    pub modified: Option<DateTime<Utc>>,
}

impl FileSystemState {
    /// Returns a state representing a non-existent path
    pub fn not_found() -> Self {
        Self {
            exists: false,
            is_file: false,
            size: 0,
            modified: None,
        }
    }

    /// Returns a state representing an existing regular file
    pub fn file(size: u64, modified: DateTime<Utc>) -> Self {
        Self {
            exists: true,
            is_file: true,
            size,
            modified: Some(modified),
        }
    }

    /// Returns true if the path exists and is a regular file
    pub fn is_regular_file(&self) -> bool {
        self.exists && self.is_file
    }

    /// Returns true if the path exists and is a directory
    pub fn is_directory(&self) -> bool {
        self.exists && !self.is_file
    }
}
