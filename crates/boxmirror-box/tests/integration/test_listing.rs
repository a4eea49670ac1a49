//! Integration tests for folder listings
//!
//! Verifies pagination, the entry ceiling, and status classification of
//! `GET /folders/{id}/items` through the `IRemoteTree` adapter.

use boxmirror_box::listing::{self, ITEM_FIELDS};
use boxmirror_core::domain::{ItemKind, RemoteId};
use boxmirror_core::ports::{IRemoteTree, RemoteError};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, ResponseTemplate,
};

use crate::common;

fn id(value: &str) -> RemoteId {
    RemoteId::new(value).unwrap()
}

// ============================================================================
// Single page
// ============================================================================

#[tokio::test]
async fn test_list_children_single_page() {
    let (server, client) = common::setup_box_mock().await;

    Mock::given(method("GET"))
        .and(path("/folders/0/items"))
        .and(query_param("fields", ITEM_FIELDS))
        .and(query_param("limit", "1000"))
        .and(query_param("offset", "0"))
        .and(header("authorization", "Bearer test-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_count": 3,
            "entries": [
                common::folder_entry("10", "Projects"),
                common::file_entry("11", "report.pdf", 2048),
                common::link_entry("12", "Wiki", "https://example.com/wiki")
            ],
            "offset": 0,
            "limit": 1000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let items = tree.list_children(&id("0")).await.expect("listing failed");

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].kind, ItemKind::Container);
    assert_eq!(items[0].name, "Projects");
    assert_eq!(items[1].kind, ItemKind::File);
    assert_eq!(items[1].size, Some(2048));
    assert!(items[1].lock.is_none());
    assert_eq!(items[2].kind, ItemKind::Link);
    assert_eq!(items[2].url.as_deref(), Some("https://example.com/wiki"));
}

#[tokio::test]
async fn test_list_children_empty_folder() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_items_page(&server, "5", 0, 0, serde_json::json!([])).await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let items = tree.list_children(&id("5")).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_list_children_keeps_unknown_types() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_items_page(
        &server,
        "5",
        0,
        1,
        serde_json::json!([{ "type": "hub", "id": "900", "name": "Team hub" }]),
    )
    .await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let items = tree.list_children(&id("5")).await.unwrap();
    assert_eq!(items[0].kind, ItemKind::Unsupported("hub".to_string()));
}

#[tokio::test]
async fn test_list_children_reports_lock() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_items_page(
        &server,
        "5",
        0,
        1,
        serde_json::json!([{
            "type": "file",
            "id": "31",
            "name": "budget.xlsx",
            "modified_at": "2024-01-01T00:00:00Z",
            "size": 10,
            "lock": { "type": "lock", "id": "777", "expired_at": null }
        }]),
    )
    .await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let items = tree.list_children(&id("5")).await.unwrap();
    assert!(items[0].is_locked());
    assert_eq!(items[0].lock.as_ref().unwrap().id, "777");
}

// ============================================================================
// Pagination and ceiling
// ============================================================================

#[tokio::test]
async fn test_list_children_follows_offsets() {
    let (server, client) = common::setup_box_mock().await;

    common::mount_items_page(
        &server,
        "7",
        0,
        5,
        serde_json::json!([
            common::file_entry("1", "a.txt", 1),
            common::file_entry("2", "b.txt", 1)
        ]),
    )
    .await;
    common::mount_items_page(
        &server,
        "7",
        2,
        5,
        serde_json::json!([
            common::file_entry("3", "c.txt", 1),
            common::file_entry("4", "d.txt", 1)
        ]),
    )
    .await;
    common::mount_items_page(
        &server,
        "7",
        4,
        5,
        serde_json::json!([common::file_entry("5", "e.txt", 1)]),
    )
    .await;

    let tree = common::remote_tree(client, 2, 100);
    let items = tree.list_children(&id("7")).await.unwrap();

    let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
}

#[tokio::test]
async fn test_list_children_over_ceiling_fails_without_more_pages() {
    let (server, client) = common::setup_box_mock().await;

    Mock::given(method("GET"))
        .and(path("/folders/8/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_count": 12_000,
            "entries": [common::file_entry("1", "a.txt", 1)],
            "offset": 0,
            "limit": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tree = common::remote_tree(client, 1, 10_000);
    let err = tree.list_children(&id("8")).await.unwrap_err();

    assert_eq!(
        err,
        RemoteError::ListingLimitExceeded {
            container_id: "8".to_string(),
            total: 12_000,
            limit: 10_000,
        }
    );
}

#[tokio::test]
async fn test_list_children_empty_page_before_total_is_invalid() {
    let (server, client) = common::setup_box_mock().await;

    common::mount_items_page(
        &server,
        "9",
        0,
        3,
        serde_json::json!([common::file_entry("1", "a.txt", 1)]),
    )
    .await;
    common::mount_items_page(&server, "9", 1, 3, serde_json::json!([])).await;

    let tree = common::remote_tree(client, 1, 100);
    let err = tree.list_children(&id("9")).await.unwrap_err();
    assert!(matches!(err, RemoteError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_list_folder_items_direct() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_items_page(
        &server,
        "0",
        0,
        1,
        serde_json::json!([common::folder_entry("44", "Archive")]),
    )
    .await;

    let items = listing::list_folder_items(&client, &id("0"), 100, 100)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].kind.is_container());
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_list_children_not_found() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_error(&server, "/folders/404/items", 404, "not_found").await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let err = tree.list_children(&id("404")).await.unwrap_err();
    assert_eq!(err, RemoteError::NotFound("not_found: mock not_found".into()));
}

#[tokio::test]
async fn test_list_children_unauthorized() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_error(&server, "/folders/1/items", 401, "unauthorized").await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let err = tree.list_children(&id("1")).await.unwrap_err();
    assert!(matches!(err, RemoteError::Unauthorized(_)));
}

#[tokio::test]
async fn test_list_children_server_error() {
    let (server, client) = common::setup_box_mock().await;
    common::mount_error(&server, "/folders/1/items", 503, "unavailable").await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let err = tree.list_children(&id("1")).await.unwrap_err();
    assert!(matches!(err, RemoteError::Remote(msg) if msg.contains("server error")));
}

#[tokio::test]
async fn test_list_children_retries_after_429() {
    let (server, client) = common::setup_box_mock().await;

    Mock::given(method("GET"))
        .and(path("/folders/3/items"))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "0"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    common::mount_items_page(
        &server,
        "3",
        0,
        1,
        serde_json::json!([common::file_entry("1", "a.txt", 1)]),
    )
    .await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let items = tree.list_children(&id("3")).await.unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_list_children_rate_limited_after_retries() {
    let (server, client) = common::setup_box_mock().await;

    Mock::given(method("GET"))
        .and(path("/folders/3/items"))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let tree = common::remote_tree(client.with_max_retries(2), 1000, 10_000);
    let err = tree.list_children(&id("3")).await.unwrap_err();
    assert_eq!(err, RemoteError::RateLimited);
}

#[tokio::test]
async fn test_list_children_malformed_body() {
    let (server, client) = common::setup_box_mock().await;

    Mock::given(method("GET"))
        .and(path("/folders/2/items"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let tree = common::remote_tree(client, 1000, 10_000);
    let err = tree.list_children(&id("2")).await.unwrap_err();
    assert!(matches!(err, RemoteError::InvalidResponse(_)));
}
