//! Remote tree port (driven/secondary port)
//!
//! This module defines the interface the sync engine uses to read a remote
//! hierarchical storage tree. The primary implementation targets the Box
//! Content API, but the trait only exposes what traversal needs: listing the
//! direct children of a container, streaming a file's bytes, and releasing a
//! lock on a file.
//!
//! ## Design Notes
//!
//! - Errors are classified with [`RemoteError`] so the engine can report
//!   listing failures and per-item failures distinctly.
//! - `list_children` returns the complete child set. Implementations that
//!   paginate do so internally and fail with
//!   [`RemoteError::ListingLimitExceeded`] instead of truncating.
//! - Uses `#[async_trait]` for async trait methods.

use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use thiserror::Error;

use crate::domain::newtypes::RemoteId;
use crate::domain::remote_item::RemoteItem;

// ============================================================================
// RemoteError
// ============================================================================

/// Errors reported by a remote tree implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The container or file does not exist
    #[error("Remote item not found: {0}")]
    NotFound(String),

    /// Credentials are missing, invalid, or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials are valid but lack permission for the item
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A container holds more entries than a single listing may return
    #[error("Container {container_id} holds {total} entries, above the listing limit of {limit}")]
    ListingLimitExceeded {
        container_id: String,
        total: u64,
        limit: u64,
    },

    /// Rate limited after exhausting retries
    #[error("Rate limited by remote service")]
    RateLimited,

    /// Any other failure reported by the remote service
    #[error("Remote error: {0}")]
    Remote(String),

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// The response did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// ByteStream
// ============================================================================

/// Chunked byte content of a remote file
///
/// Transport failures while reading surface as `io::Error` items so the
/// stream can be piped into any async sink.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>;

// ============================================================================
// IRemoteTree trait
// ============================================================================

/// Port trait for reading a remote storage tree
///
/// Implementations must be safe to share across concurrent downloads; the
/// engine holds one instance behind an `Arc` for a whole run.
#[async_trait::async_trait]
pub trait IRemoteTree: Send + Sync {
    /// Lists every direct child of a container
    ///
    /// # Arguments
    /// * `container_id` - Identifier of the container to list
    ///
    /// # Errors
    /// Returns [`RemoteError::ListingLimitExceeded`] when the container has
    /// more children than the implementation can return in one logical call.
    async fn list_children(&self, container_id: &RemoteId) -> Result<Vec<RemoteItem>, RemoteError>;

    /// Opens a byte stream over a file's content
    ///
    /// # Arguments
    /// * `file_id` - Identifier of the file (plain file or note)
    async fn open_read_stream(&self, file_id: &RemoteId) -> Result<ByteStream, RemoteError>;

    /// Releases the lock held on a file
    ///
    /// # Arguments
    /// * `file_id` - Identifier of the locked file
    async fn unlock_file(&self, file_id: &RemoteId) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_limit_message() {
        let err = RemoteError::ListingLimitExceeded {
            container_id: "0".to_string(),
            total: 12000,
            limit: 10000,
        };
        assert_eq!(
            err.to_string(),
            "Container 0 holds 12000 entries, above the listing limit of 10000"
        );
    }
}
