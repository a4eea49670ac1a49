//! Remote tree node types
//!
//! A [`RemoteItem`] is one entry returned by a container listing. It is
//! created fresh on every listing call and never cached across calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::RemoteId;

/// Kind of a remote node as reported by the listing call
///
/// Notes are not a distinct remote kind: they are plain files whose
/// sanitized name carries the note extension (see [`LeafKind`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// A folder that holds child nodes
    Container,
    /// A file with byte content
    File,
    /// A web-link shortcut pointing at a URL
    Link,
    /// A remote type outside the known set; fatal for the whole run
    Unsupported(String),
}

impl ItemKind {
    /// Returns true for folders
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container)
    }
}

/// How a leaf item is materialized locally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafKind {
    /// Byte stream piped to a local file
    File,
    /// `.url` shortcut file written from the link target
    Link,
    /// `.txt` file holding the text extracted from a serialized note
    Note,
}

impl LeafKind {
    /// Suffix appended to the sanitized name for the local target
    pub fn local_suffix(&self) -> &'static str {
        match self {
            Self::File => "",
            Self::Link => ".url",
            Self::Note => ".txt",
        }
    }

    /// Whether materializing this kind reads a remote byte stream
    pub fn has_stream(&self) -> bool {
        matches!(self, Self::File | Self::Note)
    }
}

/// Remote lock (check-out) held on a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLock {
    /// Provider-specific lock identifier
    pub id: String,
    /// When the lock lapses on its own, if it does
    pub expires_at: Option<DateTime<Utc>>,
}

/// One node of the remote tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Stable identifier, unique within one listing
    pub id: RemoteId,
    /// Display name; not filesystem-safe
    pub name: String,
    /// Node kind
    pub kind: ItemKind,
    /// Last modification time on the remote side
    pub modified_at: Option<DateTime<Utc>>,
    /// Byte count (files only)
    pub size: Option<u64>,
    /// Link target (links only)
    pub url: Option<String>,
    /// Present when the file is checked out
    pub lock: Option<RemoteLock>,
}

impl RemoteItem {
    /// Returns true if the remote file is currently locked
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }
}

/// Decides the local materialization of a non-container item
///
/// Returns `None` for containers and unsupported kinds. A file whose
/// sanitized name ends in `.{note_extension}` (ASCII case-insensitive) is a
/// note.
pub fn leaf_kind_for(kind: &ItemKind, sanitized_name: &str, note_extension: &str) -> Option<LeafKind> {
    match kind {
        ItemKind::File if has_extension(sanitized_name, note_extension) => Some(LeafKind::Note),
        ItemKind::File => Some(LeafKind::File),
        ItemKind::Link => Some(LeafKind::Link),
        ItemKind::Container | ItemKind::Unsupported(_) => None,
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        return false;
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && ext.eq_ignore_ascii_case(extension),
        None => false,
    }
}
