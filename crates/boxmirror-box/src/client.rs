//! Box Content API client
//!
//! Provides a typed HTTP client for the Box Content API. Handles bearer
//! authentication, endpoint construction, HTTP status classification and
//! retrying of rate-limited (429) requests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use boxmirror_box::client::BoxClient;
//! use boxmirror_core::domain::RemoteId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BoxClient::new("access-token-here");
//! let file_id = RemoteId::new("12345")?;
//! let response = client.download_content(&file_id).await?;
//! println!("{} bytes", response.content_length().unwrap_or(0));
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use boxmirror_core::domain::RemoteId;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::BoxError;

/// Base URL for the Box Content API 2.0
pub const BOX_BASE_URL: &str = "https://api.box.com/2.0";

/// Default retry-after duration when header is missing (30 seconds)
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Maximum number of retries for 429 responses
const DEFAULT_MAX_RETRIES: u32 = 5;

/// Longest `Retry-After` wait honoured, in seconds
const MAX_RETRY_AFTER_SECS: u64 = 3600;

/// Error body returned by the Box API on non-success statuses
#[derive(Debug, Deserialize)]
struct BoxErrorBody {
    code: Option<String>,
    message: Option<String>,
}

// ============================================================================
// BoxClient
// ============================================================================

/// HTTP client for Box Content API calls
///
/// Wraps `reqwest::Client` with authentication headers and base URL
/// construction. Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct BoxClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests
    base_url: String,
    /// OAuth2 / developer access token
    access_token: String,
    /// Retries on HTTP 429 before giving up
    max_retries: u32,
}

impl BoxClient {
    /// Creates a new BoxClient with the given access token
    ///
    /// # Arguments
    /// * `access_token` - A valid Box access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, BOX_BASE_URL)
    }

    /// Creates a new BoxClient with a custom base URL (useful for testing)
    ///
    /// # Arguments
    /// * `access_token` - A valid Box access token
    /// * `base_url` - Custom base URL for API requests
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Sets how many times a rate-limited request is retried
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns a reference to the current access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the configured 429 retry budget
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// Automatically prepends the base URL and adds the Authorization header.
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, PUT, ...)
    /// * `path` - API path relative to base URL (e.g., "/folders/0/items")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Streams the content of a file
    ///
    /// Makes `GET /files/{id}/content`. Box answers with a redirect to a
    /// download host, which reqwest follows. The returned response has a
    /// success status; its body has not been read yet.
    pub async fn download_content(&self, file_id: &RemoteId) -> Result<Response, BoxError> {
        let path = format!("/files/{}/content", file_id.as_str());
        debug!(file_id = %file_id, "Opening content stream");

        self.execute_with_retry(&path, || self.request(Method::GET, &path))
            .await
    }

    /// Releases the lock held on a file
    ///
    /// Makes `PUT /files/{id}?fields=lock` with body `{"lock": null}`.
    pub async fn unlock_file(&self, file_id: &RemoteId) -> Result<(), BoxError> {
        let path = format!("/files/{}", file_id.as_str());
        debug!(file_id = %file_id, "Releasing file lock");

        self.execute_with_retry(&path, || {
            self.request(Method::PUT, &path)
                .query(&[("fields", "lock")])
                .json(&serde_json::json!({ "lock": null }))
        })
        .await?;

        Ok(())
    }

    // ========================================================================
    // execute_with_retry - 429 response handling
    // ========================================================================

    /// Sends a request, retrying on HTTP 429 and classifying failures.
    ///
    /// `build` is called once per attempt since a sent request cannot be
    /// reused. On 429 the `Retry-After` header is honoured (integer seconds
    /// or an HTTP date) before the next attempt. Any other non-success
    /// status is mapped to a [`BoxError`].
    ///
    /// # Arguments
    /// * `path` - API path, used for logging
    /// * `build` - Produces the request to send
    pub async fn execute_with_retry<F>(&self, path: &str, build: F) -> Result<Response, BoxError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            let response = build().send().await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .map(|v| parse_retry_after(v, DEFAULT_RETRY_AFTER))
                    .unwrap_or(DEFAULT_RETRY_AFTER);

                if attempt >= self.max_retries {
                    warn!(path, attempts = attempt + 1, "429 retry limit exhausted");
                    return Err(BoxError::TooManyRequests { retry_after });
                }

                info!(
                    path,
                    attempt,
                    retry_after_ms = retry_after.as_millis(),
                    "Received 429, backing off"
                );

                tokio::time::sleep(retry_after).await;
                attempt += 1;
                continue;
            }

            if !response.status().is_success() {
                return Err(error_from_response(path, response).await);
            }

            if attempt > 0 {
                info!(path, attempt, "Request succeeded after retry");
            }

            return Ok(response);
        }
    }
}

/// Classifies a non-success response into a [`BoxError`]
async fn error_from_response(path: &str, response: Response) -> BoxError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<BoxErrorBody>(&body) {
        Ok(BoxErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("{code}: {message}"),
        Ok(BoxErrorBody {
            message: Some(message),
            ..
        }) => message,
        _ if body.is_empty() => path.to_string(),
        _ => body,
    };

    debug!(path, status = status.as_u16(), %message, "Request failed");

    match status {
        StatusCode::UNAUTHORIZED => BoxError::Unauthorized(message),
        StatusCode::FORBIDDEN => BoxError::Forbidden(message),
        StatusCode::NOT_FOUND => BoxError::NotFound(message),
        s if s.is_server_error() => BoxError::ServerError(message),
        s => BoxError::Api {
            status: s.as_u16(),
            message,
        },
    }
}

/// Parses the `Retry-After` header value.
///
/// The header can be either:
/// - An integer number of seconds (e.g., "30")
/// - An HTTP-date (e.g., "Fri, 31 Dec 2025 23:59:59 GMT") - parsed as seconds from now
///
/// Falls back to the default duration if parsing fails or either form asks
/// for more than an hour.
pub fn parse_retry_after(value: &str, default: Duration) -> Duration {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        if seconds <= MAX_RETRY_AFTER_SECS {
            return Duration::from_secs(seconds);
        }
        warn!(value, "Retry-After exceeds one hour, using default");
        return default;
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value.trim()) {
        let remaining = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
        match u64::try_from(remaining.num_seconds()) {
            Ok(secs) if secs <= MAX_RETRY_AFTER_SECS => return Duration::from_secs(secs),
            Err(_) => return Duration::ZERO,
            Ok(_) => {}
        }
    }

    warn!(value, "Could not parse Retry-After header, using default");
    default
}
