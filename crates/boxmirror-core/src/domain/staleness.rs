//! Staleness classification
//!
//! Decides from metadata alone whether a local copy of a leaf item must be
//! refreshed. There is no content hashing: a remote edit that keeps the same
//! size and an equal-or-earlier timestamp goes undetected.

use std::fmt;

use super::local_state::FileSystemState;
use super::remote_item::{LeafKind, RemoteItem};

/// Outcome of comparing a local target with its remote item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// Local copy reflects the remote item
    Current,
    /// Nothing usable exists at the local path
    Missing,
    /// Remote carries no modification time, so freshness cannot be proven
    UnknownRemoteTime,
    /// Remote was modified after the local copy
    RemoteNewer,
    /// Byte sizes differ (plain files only)
    SizeMismatch { local: u64, remote: u64 },
}

impl Staleness {
    /// Returns true if the local copy must be (re)written
    pub fn is_stale(&self) -> bool {
        !matches!(self, Self::Current)
    }
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => write!(f, "up to date"),
            Self::Missing => write!(f, "no local copy"),
            Self::UnknownRemoteTime => write!(f, "remote modification time unknown"),
            Self::RemoteNewer => write!(f, "remote is newer"),
            Self::SizeMismatch { local, remote } => {
                write!(f, "size differs (local {local}, remote {remote})")
            }
        }
    }
}

/// Classifies a local target against a remote leaf item
///
/// The target is stale when nothing exists locally, or when the remote
/// modification time is strictly later than the local one. For plain files
/// a size difference is an independent second signal. Notes are exempt from
/// the size check because the extracted text never matches the serialized
/// note size; links are exempt because the remote size describes no local
/// bytes.
pub fn classify(local: &FileSystemState, remote: &RemoteItem, leaf: LeafKind) -> Staleness {
    if !local.is_regular_file() {
        return Staleness::Missing;
    }

    let Some(remote_modified) = remote.modified_at else {
        return Staleness::UnknownRemoteTime;
    };

    match local.modified {
        Some(local_modified) if remote_modified <= local_modified => {}
        _ => return Staleness::RemoteNewer,
    }

    if leaf == LeafKind::File {
        if let Some(remote_size) = remote.size {
            if remote_size != local.size {
                return Staleness::SizeMismatch {
                    local: local.size,
                    remote: remote_size,
                };
            }
        }
    }

    Staleness::Current
}

/// Returns true if the local target must be refreshed
pub fn is_stale(local: &FileSystemState, remote: &RemoteItem, leaf: LeafKind) -> bool {
    classify(local, remote, leaf).is_stale()
}
