//! Shared test helpers for Box API integration tests
//!
//! Provides wiremock-based mock server setup for Box Content API endpoints.
//! Each helper mounts the necessary mock endpoints on a server created by
//! [`setup_box_mock`].

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use boxmirror_box::client::BoxClient;
use boxmirror_box::provider::BoxRemoteTree;

/// Access token every mock expects
pub const TEST_TOKEN: &str = "test-access-token";

/// Starts a mock server and returns a (MockServer, BoxClient) tuple.
pub async fn setup_box_mock() -> (MockServer, BoxClient) {
    let server = MockServer::start().await;
    let client = BoxClient::with_base_url(TEST_TOKEN, server.uri());
    (server, client)
}

/// Wraps a client in a remote tree with the given listing limits.
pub fn remote_tree(client: BoxClient, page_size: u32, max_entries: u32) -> BoxRemoteTree {
    BoxRemoteTree::new(client).with_listing_limits(page_size, max_entries)
}

/// JSON entry for a folder
pub fn folder_entry(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "folder",
        "id": id,
        "name": name,
        "modified_at": "2024-03-01T12:00:00-08:00",
        "size": 0
    })
}

/// JSON entry for an unlocked file
pub fn file_entry(id: &str, name: &str, size: u64) -> serde_json::Value {
    serde_json::json!({
        "type": "file",
        "id": id,
        "name": name,
        "modified_at": "2024-03-01T12:00:00Z",
        "size": size,
        "lock": null
    })
}

/// JSON entry for a web link
pub fn link_entry(id: &str, name: &str, url: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "web_link",
        "id": id,
        "name": name,
        "modified_at": "2024-03-01T12:00:00Z",
        "url": url
    })
}

/// Mounts one page of `GET /folders/{id}/items` answered for the given offset.
pub async fn mount_items_page(
    server: &MockServer,
    folder_id: &str,
    offset: u64,
    total_count: u64,
    entries: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(format!("/folders/{folder_id}/items")))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_count": total_count,
            "entries": entries,
            "offset": offset,
            "limit": 1000
        })))
        .mount(server)
        .await;
}

/// Mounts a file content endpoint for a specific file ID.
pub async fn mount_content(server: &MockServer, file_id: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{file_id}/content")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .append_header("Content-Type", "application/octet-stream"),
        )
        .mount(server)
        .await;
}

/// Mounts a Box-style error response for any request to `request_path`.
pub async fn mount_error(server: &MockServer, request_path: &str, status: u16, code: &str) {
    Mock::given(path(request_path))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "type": "error",
            "status": status,
            "code": code,
            "message": format!("mock {code}")
        })))
        .mount(server)
        .await;
}
