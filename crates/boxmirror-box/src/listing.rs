//! Box folder listings
//!
//! Implements `GET /folders/{id}/items`, which returns the direct children of
//! a folder in offset-paginated pages.
//!
//! ## Listing Flow
//!
//! 1. Request the first page with the field set the sync engine needs
//! 2. Refuse the listing if `total_count` exceeds the configured ceiling
//! 3. Follow pages by offset until `total_count` entries are collected
//!
//! A listing never returns a truncated child set: it either returns every
//! entry or fails.

use boxmirror_core::domain::{ItemKind, RemoteId, RemoteItem, RemoteLock};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::client::BoxClient;
use crate::BoxError;

/// Fields requested for every listed entry
pub const ITEM_FIELDS: &str = "name,type,modified_at,size,url,lock";

// ============================================================================
// Box API response types (JSON deserialization)
// ============================================================================

/// One page of `GET /folders/{id}/items`
///
/// See: <https://developer.box.com/reference/get-folders-id-items/>
#[derive(Debug, Deserialize)]
pub struct BoxItemsPage {
    /// Number of entries in the whole folder, across all pages
    pub total_count: u64,

    /// Entries on this page
    #[serde(default)]
    pub entries: Vec<BoxItem>,

    /// Offset of the first entry on this page
    #[serde(default)]
    pub offset: u64,

    /// Page size the server applied
    #[serde(default)]
    pub limit: u64,
}

/// A folder entry: a folder, file or web link
#[derive(Debug, Deserialize)]
pub struct BoxItem {
    /// `folder`, `file` or `web_link`
    #[serde(rename = "type")]
    pub item_type: String,

    /// Identifier, a decimal string
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Last modification time (RFC 3339 with offset)
    pub modified_at: Option<DateTime<Utc>>,

    /// Byte size (files and folders)
    pub size: Option<u64>,

    /// Target URL (web links only)
    pub url: Option<String>,

    /// Lock held on a file, `null` when unlocked
    pub lock: Option<BoxLock>,
}

/// Lock object attached to a file
#[derive(Debug, Deserialize)]
pub struct BoxLock {
    /// Lock identifier
    pub id: String,

    /// When the lock lapses
    pub expired_at: Option<DateTime<Utc>>,
}

// ============================================================================
// ItemParser - converts Box API entries to domain types
// ============================================================================

/// Parser for converting Box listing entries into [`RemoteItem`]s
pub struct ItemParser;

impl ItemParser {
    /// Maps a Box `type` value to an [`ItemKind`]
    ///
    /// Values outside the known set are kept as [`ItemKind::Unsupported`]
    /// so the engine can decide how to react.
    pub fn parse_kind(item_type: &str) -> ItemKind {
        match item_type {
            "folder" => ItemKind::Container,
            "file" => ItemKind::File,
            "web_link" => ItemKind::Link,
            other => ItemKind::Unsupported(other.to_string()),
        }
    }

    /// Parses a single Box entry
    ///
    /// # Errors
    /// Returns [`BoxError::InvalidResponse`] if the entry id is not a valid
    /// remote identifier
    pub fn parse_item(item: BoxItem) -> Result<RemoteItem, BoxError> {
        let id = RemoteId::new(item.id)
            .map_err(|e| BoxError::InvalidResponse(format!("entry with bad id: {e}")))?;

        Ok(RemoteItem {
            id,
            name: item.name,
            kind: Self::parse_kind(&item.item_type),
            modified_at: item.modified_at,
            size: item.size,
            url: item.url,
            lock: item.lock.map(|lock| RemoteLock {
                id: lock.id,
                expires_at: lock.expired_at,
            }),
        })
    }
}

// ============================================================================
// Listing functions
// ============================================================================

/// Fetches one page of a folder listing
///
/// # Arguments
///
/// * `client` - A reference to the authenticated [`BoxClient`]
/// * `folder_id` - Folder to list
/// * `offset` - Index of the first entry to return
/// * `limit` - Maximum entries on the page
pub async fn get_items_page(
    client: &BoxClient,
    folder_id: &RemoteId,
    offset: u64,
    limit: u32,
) -> Result<BoxItemsPage, BoxError> {
    let path = format!("/folders/{}/items", folder_id.as_str());
    let offset = offset.to_string();
    let limit = limit.to_string();

    let response = client
        .execute_with_retry(&path, || {
            client.request(Method::GET, &path).query(&[
                ("fields", ITEM_FIELDS),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ])
        })
        .await?;

    response
        .json::<BoxItemsPage>()
        .await
        .map_err(|e| BoxError::InvalidResponse(format!("folder items page: {e}")))
}

/// Lists every direct child of a folder, following pagination
///
/// # Arguments
///
/// * `client` - A reference to the authenticated [`BoxClient`]
/// * `folder_id` - Folder to list
/// * `page_size` - Entries requested per page
/// * `max_entries` - Ceiling on the folder's entry count
///
/// # Errors
///
/// Returns [`BoxError::ListingLimitExceeded`] as soon as a page reports a
/// `total_count` above `max_entries`, and [`BoxError::InvalidResponse`] if a
/// page comes back empty while entries are still missing.
pub async fn list_folder_items(
    client: &BoxClient,
    folder_id: &RemoteId,
    page_size: u32,
    max_entries: u32,
) -> Result<Vec<RemoteItem>, BoxError> {
    let mut items: Vec<RemoteItem> = Vec::new();
    let mut offset: u64 = 0;
    let mut page_count: u32 = 0;

    loop {
        let page = get_items_page(client, folder_id, offset, page_size).await?;
        page_count += 1;

        if page.total_count > u64::from(max_entries) {
            return Err(BoxError::ListingLimitExceeded {
                folder_id: folder_id.to_string(),
                total: page.total_count,
                limit: u64::from(max_entries),
            });
        }

        debug!(
            folder_id = %folder_id,
            page = page_count,
            entries = page.entries.len(),
            total = page.total_count,
            "Received folder items page"
        );

        let received = page.entries.len() as u64;
        for entry in page.entries {
            items.push(ItemParser::parse_item(entry)?);
        }

        if items.len() as u64 >= page.total_count {
            break;
        }

        if received == 0 {
            return Err(BoxError::InvalidResponse(format!(
                "folder {folder_id} returned an empty page at offset {offset} with {} of {} entries collected",
                items.len(),
                page.total_count
            )));
        }

        offset += received;
    }

    debug!(
        folder_id = %folder_id,
        total_items = items.len(),
        total_pages = page_count,
        "Folder listing complete"
    );

    Ok(items)
}

// ============================================================================
// Tests
// ============================================================================
