//! BoxMirror Box - Box Content API client
//!
//! Provides an async client for the read side of the Box Content API:
//! - Paginated folder listings with a hard entry ceiling
//! - Streaming file content downloads
//! - Releasing file locks
//!
//! ## Modules
//!
//! - [`client`] - Box API HTTP client with 429 retry handling
//! - [`listing`] - Folder item listings and their JSON types
//! - [`provider`] - [`IRemoteTree`](boxmirror_core::ports::IRemoteTree) adapter

pub mod client;
pub mod listing;
pub mod provider;

use std::time::Duration;

use boxmirror_core::ports::RemoteError;
use thiserror::Error;

/// Errors that can occur when communicating with the Box API
#[derive(Debug, Error)]
pub enum BoxError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded; retry after the specified duration
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Duration to wait before retrying
        retry_after: Duration,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Any other non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message from the error body, or the raw body
        message: String,
    },

    /// A folder holds more entries than a listing may return
    #[error("Folder {folder_id} holds {total} entries, above the listing limit of {limit}")]
    ListingLimitExceeded {
        /// Folder whose listing was refused
        folder_id: String,
        /// `total_count` reported by the API
        total: u64,
        /// Configured ceiling
        limit: u64,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<BoxError> for RemoteError {
    fn from(err: BoxError) -> Self {
        match err {
            BoxError::Unauthorized(msg) => RemoteError::Unauthorized(msg),
            BoxError::Forbidden(msg) => RemoteError::Forbidden(msg),
            BoxError::NotFound(msg) => RemoteError::NotFound(msg),
            BoxError::TooManyRequests { .. } => RemoteError::RateLimited,
            BoxError::ServerError(msg) => RemoteError::Remote(format!("server error: {msg}")),
            BoxError::Api { status, message } => {
                RemoteError::Remote(format!("HTTP {status}: {message}"))
            }
            BoxError::ListingLimitExceeded {
                folder_id,
                total,
                limit,
            } => RemoteError::ListingLimitExceeded {
                container_id: folder_id,
                total,
                limit,
            },
            BoxError::NetworkError(e) => RemoteError::Network(e.to_string()),
            BoxError::InvalidResponse(msg) => RemoteError::InvalidResponse(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_map_to_remote_errors() {
        assert_eq!(
            RemoteError::from(BoxError::NotFound("folder 9".into())),
            RemoteError::NotFound("folder 9".into())
        );
        assert_eq!(
            RemoteError::from(BoxError::Unauthorized("expired".into())),
            RemoteError::Unauthorized("expired".into())
        );
        assert_eq!(
            RemoteError::from(BoxError::TooManyRequests {
                retry_after: Duration::from_secs(1)
            }),
            RemoteError::RateLimited
        );
    }

    #[test]
    fn test_listing_limit_maps_fields() {
        let err = RemoteError::from(BoxError::ListingLimitExceeded {
            folder_id: "42".into(),
            total: 20_000,
            limit: 10_000,
        });
        assert_eq!(
            err,
            RemoteError::ListingLimitExceeded {
                container_id: "42".into(),
                total: 20_000,
                limit: 10_000,
            }
        );
    }

    #[test]
    fn test_api_error_keeps_status() {
        let err = RemoteError::from(BoxError::Api {
            status: 409,
            message: "conflict".into(),
        });
        assert_eq!(err, RemoteError::Remote("HTTP 409: conflict".into()));
    }
}
