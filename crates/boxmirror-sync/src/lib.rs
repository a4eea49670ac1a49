//! BoxMirror Sync - Remote tree mirroring engine
//!
//! Provides:
//! - Breadth-first traversal of a remote container tree
//! - Metadata-based staleness checks before every download
//! - Bounded-concurrency downloads shared across the whole run
//! - Per-kind materialization of files, web links and notes
//!
//! ## Modules
//!
//! - [`engine`] - Tree sync engine draining the traversal queue
//! - [`filesystem`] - Local filesystem adapter on `tokio::fs`
//! - [`limiter`] - Sliding-window concurrency limiter
//! - [`queue`] - Arena-backed traversal queue
//! - [`writer`] - Item writers for files, links and notes

pub mod engine;
pub mod filesystem;
pub mod limiter;
pub mod queue;
pub mod writer;

use std::io;

use boxmirror_core::ports::RemoteError;
use thiserror::Error;

/// Errors that can occur while mirroring a remote tree
#[derive(Debug, Error)]
pub enum SyncError {
    /// A container could not be listed; its subtree is abandoned
    #[error("Listing of container {container_id} failed: {source}")]
    Listing {
        container_id: String,
        #[source]
        source: RemoteError,
    },

    /// Opening or unlocking one item failed on the remote side
    #[error("Remote operation on {item_id} failed: {source}")]
    Remote {
        item_id: String,
        #[source]
        source: RemoteError,
    },

    /// A transfer broke off mid-stream; a partial file may remain
    #[error("Transfer of {item_id} failed: {source}")]
    Stream {
        item_id: String,
        #[source]
        source: io::Error,
    },

    /// A note payload was not in the expected structured form
    #[error("Note {item_id} could not be parsed: {reason}")]
    NoteParse { item_id: String, reason: String },

    /// The remote reported a node type outside the known set
    #[error("Unsupported item type '{item_type}' for {item_id} ({name})")]
    UnsupportedItemType {
        item_id: String,
        name: String,
        item_type: String,
    },

    /// A web link carried no target URL
    #[error("Link {item_id} has no URL")]
    MissingLinkUrl { item_id: String },

    /// An I/O error occurred during local file operations
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl SyncError {
    /// Returns true for errors that abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsupportedItemType { .. })
    }
}
