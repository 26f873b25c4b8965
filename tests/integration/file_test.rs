//! Integration tests for upload, listing, metadata, and download.

use http::StatusCode;
use uuid::Uuid;

use crate::helpers::{MultipartForm, TestApp};

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], "connected");
}

#[tokio::test]
async fn test_list_files_empty() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/files").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data().as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_upload_file() {
    let app = TestApp::new().await;

    let response = app.upload("notes.txt", b"hello world").await;

    assert_eq!(response.status, StatusCode::CREATED);
    let data = response.data();
    assert_eq!(data["display_name"], "notes.txt");
    assert_eq!(data["original_name"], "notes.txt");
    assert_eq!(data["content_type"], "text/plain");
    assert_eq!(data["size_bytes"], 11);
    assert_eq!(data["version_number"], 1);
    assert_eq!(data["is_latest"], true);
    assert!(data["deleted_at"].is_null());
    // Version 1 anchors its own chain.
    assert_eq!(data["chain_id"], data["id"]);
    assert!(data["parent_id"].is_null());
}

#[tokio::test]
async fn test_upload_with_metadata() {
    let app = TestApp::new().await;

    let form = MultipartForm::new()
        .file("report.pdf", "application/pdf", b"%PDF-1.4")
        .text("display_name", "Quarterly Report")
        .text("description", "Q3 numbers")
        .text("tags", "finance, q3");
    let response = app.multipart("POST", "/api/files", form).await;

    assert_eq!(response.status, StatusCode::CREATED);
    let data = response.data();
    assert_eq!(data["display_name"], "Quarterly Report");
    assert_eq!(data["original_name"], "report.pdf");
    assert_eq!(data["description"], "Q3 numbers");
    assert_eq!(data["tags"][0], "finance");
    assert_eq!(data["tags"][1], "q3");
}

#[tokio::test]
async fn test_upload_without_file_part() {
    let app = TestApp::new().await;

    let form = MultipartForm::new().text("display_name", "No content");
    let response = app.multipart("POST", "/api/files", form).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_upload_empty_file_rejected() {
    let app = TestApp::new().await;

    let response = app.upload("empty.txt", b"").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_shows_uploaded_file() {
    let app = TestApp::new().await;
    let id = app.upload("a.txt", b"data").await.id();

    let response = app.request("GET", "/api/files").await;

    assert_eq!(response.status, StatusCode::OK);
    let items = response.data().as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id.as_str());
}

#[tokio::test]
async fn test_get_file() {
    let app = TestApp::new().await;
    let id = app.upload("a.txt", b"data").await.id();

    let response = app.request("GET", &format!("/api/files/{id}")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["id"], id.as_str());
}

#[tokio::test]
async fn test_get_file_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request("GET", &format!("/api/files/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_download_file() {
    let app = TestApp::new().await;
    let id = app.upload("a.txt", b"download me").await.id();

    let response = app
        .request("GET", &format!("/api/files/{id}/download"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.raw, b"download me");
    assert_eq!(response.headers["content-type"], "text/plain");
    assert_eq!(
        response.headers["content-disposition"],
        "attachment; filename=\"a.txt\""
    );
}

#[tokio::test]
async fn test_download_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request("GET", &format!("/api/files/{}/download", Uuid::new_v4()))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metadata_update_keeps_version() {
    let app = TestApp::new().await;
    let id = app.upload("a.txt", b"data").await.id();

    let form = MultipartForm::new()
        .text("display_name", "Renamed")
        .text("description", "now described");
    let response = app.multipart("PUT", &format!("/api/files/{id}"), form).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["display_name"], "Renamed");
    assert_eq!(data["description"], "now described");
    assert_eq!(data["version_number"], 1);
    assert_eq!(data["id"], id.as_str());
}

#[tokio::test]
async fn test_metadata_update_blank_name_rejected() {
    let app = TestApp::new().await;
    let id = app.upload("a.txt", b"data").await.id();

    let form = MultipartForm::new().text("display_name", "   ");
    let response = app.multipart("PUT", &format!("/api/files/{id}"), form).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
