//! BoxRemoteTree - IRemoteTree implementation for the Box Content API
//!
//! Wraps the [`BoxClient`] and delegates to the listing and client modules
//! to fulfil the [`IRemoteTree`] port contract.
//!
//! ## Design Notes
//!
//! - No interior mutability: the access token is fixed for the lifetime of
//!   a run, so the client is shared read-only across concurrent downloads.
//! - Content is exposed as a [`ByteStream`] over the response body; reqwest
//!   transport errors become `io::Error` items.

use std::io;

use boxmirror_core::config::RemoteConfig;
use boxmirror_core::domain::{RemoteId, RemoteItem};
use boxmirror_core::ports::{ByteStream, IRemoteTree, RemoteError};
use futures_util::TryStreamExt;
use tracing::debug;

use crate::client::BoxClient;
use crate::listing;

/// Remote tree backed by a Box account
#[derive(Debug, Clone)]
pub struct BoxRemoteTree {
    /// The underlying Box API client
    client: BoxClient,
    /// Entries requested per listing page
    page_size: u32,
    /// Ceiling on a single folder's entry count
    max_entries: u32,
}

impl BoxRemoteTree {
    /// Creates a new `BoxRemoteTree` with the default listing limits
    pub fn new(client: BoxClient) -> Self {
        let defaults = RemoteConfig::default();
        Self {
            client,
            page_size: defaults.page_size,
            max_entries: defaults.max_entries,
        }
    }

    /// Builds a client and tree from the `remote` configuration section
    pub fn from_config(config: &RemoteConfig, access_token: impl Into<String>) -> Self {
        let client = BoxClient::with_base_url(access_token, config.api_base_url.clone())
            .with_max_retries(config.max_retries);
        Self::new(client).with_listing_limits(config.page_size, config.max_entries)
    }

    /// Overrides the listing page size and entry ceiling
    pub fn with_listing_limits(mut self, page_size: u32, max_entries: u32) -> Self {
        self.page_size = page_size;
        self.max_entries = max_entries;
        self
    }

    /// Returns the underlying client
    pub fn client(&self) -> &BoxClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl IRemoteTree for BoxRemoteTree {
    async fn list_children(&self, container_id: &RemoteId) -> Result<Vec<RemoteItem>, RemoteError> {
        debug!(id = %container_id, "BoxRemoteTree::list_children");
        let items = listing::list_folder_items(
            &self.client,
            container_id,
            self.page_size,
            self.max_entries,
        )
        .await?;
        Ok(items)
    }

    async fn open_read_stream(&self, file_id: &RemoteId) -> Result<ByteStream, RemoteError> {
        debug!(id = %file_id, "BoxRemoteTree::open_read_stream");
        let response = self.client.download_content(file_id).await?;
        let stream = response.bytes_stream().map_err(io::Error::other);
        Ok(Box::pin(stream))
    }

    async fn unlock_file(&self, file_id: &RemoteId) -> Result<(), RemoteError> {
        debug!(id = %file_id, "BoxRemoteTree::unlock_file");
        self.client.unlock_file(file_id).await?;
        Ok(())
    }
}
