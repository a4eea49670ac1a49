//! Integration tests for content streaming and unlocking
//!
//! Verifies `GET /files/{id}/content` and `PUT /files/{id}` against a
//! wiremock-based Box API mock server.

use boxmirror_core::domain::RemoteId;
use boxmirror_core::ports::{IRemoteTree, RemoteError};
use futures_util::TryStreamExt;
use wiremock::{
    matchers::{body_json, method, path, query_param},
    Mock, ResponseTemplate,
};

use crate::common;

fn id(value: &str) -> RemoteId {
    RemoteId::new(value).unwrap()
}

async fn read_all(tree: &impl IRemoteTree, file_id: &str) -> Result<Vec<u8>, RemoteError> {
    let stream = tree.open_read_stream(&id(file_id)).await?;
    let chunks: Vec<bytes::Bytes> = stream
        .try_collect()
        .await
        .map_err(|e| RemoteError::Network(e.to_string()))?;
    Ok(chunks.concat())
}

// ============================================================================
// Content tests
// ============================================================================

#[tokio::test]
async fn test_open_read_stream_returns_content() {
    let (server, client) = common::setup_box_mock().await;

    let content = b"Hello, Box! This is test content.";
    common::mount_content(&server, "1001", content).await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let data = read_all(&tree, "1001").await.expect("download failed");
    assert_eq!(data, content);
}

#[tokio::test]
async fn test_open_read_stream_large_file() {
    let (server, client) = common::setup_box_mock().await;

    let content: Vec<u8> = (0..1_048_576).map(|i| (i % 256) as u8).collect();
    common::mount_content(&server, "1002", &content).await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let data = read_all(&tree, "1002").await.unwrap();
    assert_eq!(data.len(), 1_048_576);
    assert_eq!(data, content);
}

#[tokio::test]
async fn test_open_read_stream_empty_file() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_content(&server, "1003", &[]).await;

    let tree = common::remote_tree(client, 1000, 10_000);
    assert!(read_all(&tree, "1003").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_open_read_stream_follows_redirect() {
    let (server, client) = common::setup_box_mock().await;

    Mock::given(method("GET"))
        .and(path("/files/1004/content"))
        .respond_with(
            ResponseTemplate::new(302)
                .append_header("Location", format!("{}/dl/1004", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/1004"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"redirected".to_vec()))
        .mount(&server)
        .await;

    let tree = common::remote_tree(client, 1000, 10_000);
    assert_eq!(read_all(&tree, "1004").await.unwrap(), b"redirected");
}

#[tokio::test]
async fn test_open_read_stream_not_found() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_error(&server, "/files/404/content", 404, "not_found").await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let err = tree.open_read_stream(&id("404")).await.err().unwrap();
    assert!(matches!(err, RemoteError::NotFound(_)));
}

#[tokio::test]
async fn test_open_read_stream_forbidden() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_error(&server, "/files/5/content", 403, "access_denied_insufficient_permissions")
        .await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let err = tree.open_read_stream(&id("5")).await.err().unwrap();
    assert!(matches!(err, RemoteError::Forbidden(_)));
}

// ============================================================================
// Unlock tests
// ============================================================================

#[tokio::test]
async fn test_unlock_file_sends_null_lock() {
    let (server, client) = common::setup_box_mock().await;

    Mock::given(method("PUT"))
        .and(path("/files/2001"))
        .and(query_param("fields", "lock"))
        .and(body_json(serde_json::json!({ "lock": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "file",
            "id": "2001",
            "lock": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tree = common::remote_tree(client, 1000, 10_000);
    tree.unlock_file(&id("2001")).await.expect("unlock failed");
}

#[tokio::test]
async fn test_unlock_file_forbidden() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_error(&server, "/files/2002", 403, "access_denied").await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let err = tree.unlock_file(&id("2002")).await.unwrap_err();
    assert_eq!(err, RemoteError::Forbidden("access_denied: mock access_denied".into()));
}

#[tokio::test]
async fn test_unlock_file_conflict_is_remote_error() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_error(&server, "/files/2003", 409, "conflict").await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let err = tree.unlock_file(&id("2003")).await.unwrap_err();
    assert_eq!(err, RemoteError::Remote("HTTP 409: conflict: mock conflict".into()));
}
