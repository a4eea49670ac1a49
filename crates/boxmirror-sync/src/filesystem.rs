//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`ILocalFileSystem`] using `tokio::fs` for async file operations.
//!
//! ## Design Decisions
//!
//! - **Whole-buffer writes** (links, notes) go to a uniquely named temporary
//!   file in the target directory and are persisted into place, so a crash
//!   never leaves a half-written shortcut and no real sibling is touched.
//! - **Streaming writes** (plain files) open the target directly; an aborted
//!   transfer leaves the partial file behind.

use std::io::{self, ErrorKind, Write};
use std::path::Path;

use boxmirror_core::ports::local_filesystem::{FileSink, FileSystemState, ILocalFileSystem};
use chrono::DateTime;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

// ============================================================================
// LocalFileSystemAdapter struct
// ============================================================================

/// Adapter that bridges the [`ILocalFileSystem`] port to the real filesystem.
///
/// This is a zero-sized struct because all operations derive their context
/// from the path arguments. The destination root lives at a higher layer.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystemAdapter;

impl LocalFileSystemAdapter {
    /// Create a new `LocalFileSystemAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

// ============================================================================
// ILocalFileSystem implementation
// ============================================================================

#[async_trait::async_trait]
impl ILocalFileSystem for LocalFileSystemAdapter {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn stat(&self, path: &Path) -> io::Result<FileSystemState> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("path not found");
                return Ok(FileSystemState::not_found());
            }
            Err(e) => return Err(e),
        };

        let is_file = metadata.is_file();
        let size = metadata.len();

        // Convert system modified time to DateTime<Utc>.
        let modified = metadata.modified().ok().and_then(|st| {
            st.duration_since(std::time::UNIX_EPOCH)
                .ok()
                .and_then(|dur| DateTime::from_timestamp(dur.as_secs() as i64, dur.subsec_nanos()))
        });

        debug!(exists = true, is_file, size, "state retrieved");

        Ok(FileSystemState {
            exists: true,
            is_file,
            size,
            modified,
        })
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn create_directory(&self, path: &Path) -> io::Result<()> {
        debug!("creating directory");
        tokio::fs::create_dir_all(path).await
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn create_file(&self, path: &Path) -> io::Result<FileSink> {
        debug!("opening file sink");
        let file = tokio::fs::File::create(path).await?;
        Ok(Box::pin(file))
    }

    #[instrument(skip(self, data), fields(path = %path.display(), bytes = data.len()))]
    async fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let target = path.to_path_buf();
        let data = data.to_vec();

        // The temp file is removed on drop if any step fails.
        tokio::task::spawn_blocking(move || -> io::Result<()> {
            let dir = match target.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let mut tmp = NamedTempFile::new_in(dir)?;
            debug!(tmp_path = %tmp.path().display(), "writing to temporary file");
            tmp.write_all(&data)?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await??;

        debug!("write complete");
        Ok(())
    }
}

// ============================================================================
// Unit tests
// ============================================================================
