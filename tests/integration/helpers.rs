//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use filevault_api::{AppState, build_app};
use filevault_core::config::AppConfig;
use filevault_core::traits::content_store::ContentStore;
use filevault_database::repositories::file_record::FileRecordRepository;
use filevault_service::file::{DownloadService, FileService, QueryService};
use filevault_storage::local::LocalContentStore;

/// Test application context backed by an in-memory database and a
/// throwaway blob directory.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: SqlitePool,
    /// Blob directory, removed on drop
    _blob_dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let db_pool = filevault_database::connection::create_memory_pool()
            .await
            .expect("Failed to open in-memory database");

        filevault_database::migration::run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        let blob_dir = tempfile::tempdir().expect("Failed to create blob dir");
        let store: Arc<dyn ContentStore> = Arc::new(
            LocalContentStore::new(blob_dir.path().to_str().expect("utf-8 path"))
                .await
                .expect("Failed to init storage"),
        );

        let config = AppConfig::default();
        let repo = Arc::new(FileRecordRepository::new(db_pool.clone()));

        let file_service = Arc::new(FileService::new(
            Arc::clone(&repo),
            Arc::clone(&store),
            config.storage.clone(),
        ));
        let download_service =
            Arc::new(DownloadService::new(Arc::clone(&repo), Arc::clone(&store)));
        let query_service = Arc::new(QueryService::new(Arc::clone(&repo)));

        let state = AppState {
            config: Arc::new(config),
            db_pool: db_pool.clone(),
            file_service,
            download_service,
            query_service,
        };

        Self {
            router: build_app(state),
            db_pool,
            _blob_dir: blob_dir,
        }
    }

    /// Send a bodyless request (GET or DELETE).
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a multipart request built from the given form.
    pub async fn multipart(&self, method: &str, path: &str, form: MultipartForm) -> TestResponse {
        let (content_type, body) = form.finish();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload a file with the default display name derived from its name.
    pub async fn upload(&self, filename: &str, content: &[u8]) -> TestResponse {
        self.multipart(
            "POST",
            "/api/files",
            MultipartForm::new().file(filename, "text/plain", content),
        )
        .await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body")
            .to_vec();

        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }
}

/// Test HTTP response
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` for non-JSON responses
    pub body: Value,
    /// Raw response bytes
    pub raw: Vec<u8>,
}

impl TestResponse {
    /// The `data` payload of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The record id inside the `data` payload.
    pub fn id(&self) -> String {
        self.data()["id"]
            .as_str()
            .expect("response has no data.id")
            .to_string()
    }
}

const BOUNDARY: &str = "----filevault-test-boundary";

/// Builder for multipart/form-data request bodies.
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    /// Add a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Add a file field.
    pub fn file(mut self, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        self.body
            .extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (
            format!("multipart/form-data; boundary={BOUNDARY}"),
            self.body,
        )
    }
}
