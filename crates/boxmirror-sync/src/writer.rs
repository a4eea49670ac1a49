//! Item writers
//!
//! Materializes one leaf item at its local target. The caller has already
//! decided the item is stale; every writer overwrites unconditionally.
//!
//! | Kind | Source            | Local content                     |
//! |------|-------------------|-----------------------------------|
//! | File | remote byte stream | the bytes, streamed               |
//! | Link | item `url`         | `[InternetShortcut]` shortcut     |
//! | Note | remote byte stream | text extracted from the note JSON |

use std::path::Path;
use std::sync::Arc;

use boxmirror_core::domain::{LeafKind, RemoteItem};
use boxmirror_core::ports::{ILocalFileSystem, IRemoteTree};
use futures_util::TryStreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::SyncError;

/// Body of a `.url` shortcut file pointing at `url`
pub fn shortcut_body(url: &str) -> String {
    format!("[InternetShortcut]\nURL={url}\n")
}

/// Extracts the plain-text field of a serialized note
///
/// `pointer` is a JSON pointer (e.g. `/doc/text`) that must resolve to a
/// string.
pub fn extract_note_text(payload: &[u8], pointer: &str) -> Result<String, String> {
    let document: serde_json::Value =
        serde_json::from_slice(payload).map_err(|e| format!("not a JSON document: {e}"))?;

    match document.pointer(pointer) {
        Some(serde_json::Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(format!(
            "field {pointer} is {}, expected a string",
            json_type_name(other)
        )),
        None => Err(format!("field {pointer} is missing")),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ============================================================================
// ItemWriter
// ============================================================================

/// Writes files, links and notes to their local targets
pub struct ItemWriter {
    remote: Arc<dyn IRemoteTree>,
    local: Arc<dyn ILocalFileSystem>,
    text_pointer: String,
}

impl ItemWriter {
    /// Creates a writer reading note text at `text_pointer`
    pub fn new(
        remote: Arc<dyn IRemoteTree>,
        local: Arc<dyn ILocalFileSystem>,
        text_pointer: impl Into<String>,
    ) -> Self {
        Self {
            remote,
            local,
            text_pointer: text_pointer.into(),
        }
    }

    /// Materializes `item` as `leaf` at `target`
    ///
    /// Returns the number of bytes written locally. A failed file transfer
    /// leaves whatever was written so far on disk; a note that cannot be
    /// parsed writes nothing.
    #[instrument(skip(self, item), fields(id = %item.id, target = %target.display()))]
    pub async fn write(
        &self,
        item: &RemoteItem,
        leaf: LeafKind,
        target: &Path,
    ) -> Result<u64, SyncError> {
        match leaf {
            LeafKind::File => self.write_stream(item, target).await,
            LeafKind::Link => self.write_link(item, target).await,
            LeafKind::Note => self.write_note(item, target).await,
        }
    }

    async fn write_stream(&self, item: &RemoteItem, target: &Path) -> Result<u64, SyncError> {
        let mut stream = self
            .remote
            .open_read_stream(&item.id)
            .await
            .map_err(|source| SyncError::Remote {
                item_id: item.id.to_string(),
                source,
            })?;

        let mut sink = self.local.create_file(target).await?;
        let stream_error = |source| SyncError::Stream {
            item_id: item.id.to_string(),
            source,
        };

        let mut written: u64 = 0;
        while let Some(chunk) = stream.try_next().await.map_err(stream_error)? {
            sink.write_all(&chunk).await.map_err(stream_error)?;
            written += chunk.len() as u64;
        }
        sink.shutdown().await.map_err(stream_error)?;

        debug!(bytes = written, "stream written");
        Ok(written)
    }

    async fn write_link(&self, item: &RemoteItem, target: &Path) -> Result<u64, SyncError> {
        let url = item.url.as_deref().ok_or_else(|| SyncError::MissingLinkUrl {
            item_id: item.id.to_string(),
        })?;

        let body = shortcut_body(url);
        self.local.write_file(target, body.as_bytes()).await?;
        Ok(body.len() as u64)
    }

    async fn write_note(&self, item: &RemoteItem, target: &Path) -> Result<u64, SyncError> {
        let stream = self
            .remote
            .open_read_stream(&item.id)
            .await
            .map_err(|source| SyncError::Remote {
                item_id: item.id.to_string(),
                source,
            })?;

        let payload: Vec<u8> = stream
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .map_err(|source| SyncError::Stream {
                item_id: item.id.to_string(),
                source,
            })?;

        let text = extract_note_text(&payload, &self.text_pointer).map_err(|reason| {
            SyncError::NoteParse {
                item_id: item.id.to_string(),
                reason,
            }
        })?;

        self.local.write_file(target, text.as_bytes()).await?;
        debug!(payload_bytes = payload.len(), text_bytes = text.len(), "note extracted");
        Ok(text.len() as u64)
    }
}
