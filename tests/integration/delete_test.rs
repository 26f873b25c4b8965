//! Integration tests for soft deletion.

use http::StatusCode;
use uuid::Uuid;

use crate::helpers::{MultipartForm, TestApp};

#[tokio::test]
async fn test_delete_hides_file() {
    let app = TestApp::new().await;
    let id = app.upload("a.txt", b"data").await.id();

    let response = app.request("DELETE", &format!("/api/files/{id}")).await;
    assert_eq!(response.status, StatusCode::OK);

    // The record reads as absent everywhere afterwards.
    let get = app.request("GET", &format!("/api/files/{id}")).await;
    assert_eq!(get.status, StatusCode::NOT_FOUND);

    let download = app
        .request("GET", &format!("/api/files/{id}/download"))
        .await;
    assert_eq!(download.status, StatusCode::NOT_FOUND);

    let list = app.request("GET", "/api/files").await;
    assert_eq!(list.data().as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_delete_twice_is_gone() {
    let app = TestApp::new().await;
    let id = app.upload("a.txt", b"data").await.id();

    app.request("DELETE", &format!("/api/files/{id}")).await;
    let response = app.request("DELETE", &format!("/api/files/{id}")).await;

    assert_eq!(response.status, StatusCode::GONE);
    assert_eq!(response.body["error"], "ALREADY_DELETED");
}

#[tokio::test]
async fn test_delete_unknown_file() {
    let app = TestApp::new().await;

    let response = app
        .request("DELETE", &format!("/api/files/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_file_rejects_updates() {
    let app = TestApp::new().await;
    let id = app.upload("a.txt", b"data").await.id();
    app.request("DELETE", &format!("/api/files/{id}")).await;

    let form = MultipartForm::new().text("display_name", "Renamed");
    let metadata = app.multipart("PUT", &format!("/api/files/{id}"), form).await;
    assert_eq!(metadata.status, StatusCode::NOT_FOUND);

    let form = MultipartForm::new().file("a.txt", "text/plain", b"new content");
    let content = app.multipart("PUT", &format!("/api/files/{id}"), form).await;
    assert_eq!(content.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_old_version_keeps_chain() {
    let app = TestApp::new().await;
    let v1 = app.upload("doc.txt", b"first").await.id();

    let form = MultipartForm::new().file("doc.txt", "text/plain", b"second");
    let v2 = app
        .multipart("PUT", &format!("/api/files/{v1}"), form)
        .await
        .id();

    app.request("DELETE", &format!("/api/files/{v1}")).await;

    // The latest version stays listed and the history drops only v1.
    let list = app.request("GET", "/api/files").await;
    let items = list.data().as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], v2.as_str());

    let versions = app
        .request("GET", &format!("/api/files/{v2}/versions"))
        .await;
    let items = versions.data().as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["version_number"], 2);
}

#[tokio::test]
async fn test_deleting_latest_does_not_promote_parent() {
    let app = TestApp::new().await;
    let v1 = app.upload("doc.txt", b"first").await.id();

    let form = MultipartForm::new().file("doc.txt", "text/plain", b"second");
    let v2 = app
        .multipart("PUT", &format!("/api/files/{v1}"), form)
        .await
        .id();

    app.request("DELETE", &format!("/api/files/{v2}")).await;

    // v1 is not the latest, so the chain vanishes from the listing.
    let list = app.request("GET", "/api/files").await;
    assert_eq!(list.data().as_array().map(Vec::len), Some(0));

    // The historical version is still individually reachable.
    let get = app.request("GET", &format!("/api/files/{v1}")).await;
    assert_eq!(get.status, StatusCode::OK);
    assert_eq!(get.data()["is_latest"], false);
}
