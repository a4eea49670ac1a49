//! Local filesystem port (driven/secondary port)
//!
//! This module defines the byte-sink side of a sync run: querying the state
//! of a local target, creating directories, and writing file content either
//! all at once or through a streaming sink.
//!
//! ## Design Notes
//!
//! - Uses `std::io::Result` so the engine can distinguish write failures
//!   from remote failures without inspecting adapter-specific errors.
//! - Writes overwrite unconditionally; deciding whether to write is the
//!   caller's job.

use std::io;
use std::path::Path;
use std::pin::Pin;

use tokio::io::AsyncWrite;

pub use crate::domain::local_state::FileSystemState;

/// Streaming sink for one local file
pub type FileSink = Pin<Box<dyn AsyncWrite + Send>>;

/// Port trait for local filesystem operations
#[async_trait::async_trait]
pub trait ILocalFileSystem: Send + Sync {
    /// Gets the current state of a file or directory
    ///
    /// Returns `FileSystemState::not_found()` if the path doesn't exist
    /// (does not return an error for missing paths).
    async fn stat(&self, path: &Path) -> io::Result<FileSystemState>;

    /// Creates a directory and all parent directories as needed
    ///
    /// Succeeds if the directory already exists.
    async fn create_directory(&self, path: &Path) -> io::Result<()>;

    /// Creates or truncates a file and returns a sink for its content
    ///
    /// Parent directories are NOT automatically created.
    async fn create_file(&self, path: &Path) -> io::Result<FileSink>;

    /// Writes data to a file, replacing any previous content
    ///
    /// Parent directories are NOT automatically created.
    async fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;
}
