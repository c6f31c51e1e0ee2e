use std::path::PathBuf;
use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    media_storage::{FileNaming, LocalMediaBackend, MediaStorage, UPLOADS_DIR},
    server,
    types::Environment,
};
use gallery_storage::{DocumentBackend, GalleryStore, LocalFileBackend};
use tempfile::TempDir;
use tower::ServiceExt;

use super::{multipart_body, Part, MULTIPART_BOUNDARY};

/// Upload cap used unless a test asks for another one
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// Setup test environment
pub fn setup_test_env() {
    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Router backed by a temporary directory holding the gallery document and uploads
pub struct TestSetup {
    pub router: Router,
    pub gallery_path: PathBuf,
    pub uploads_dir: PathBuf,
    // Keep the directory alive for the duration of the test
    _temp_dir: TempDir,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::build(TEST_MAX_UPLOAD_BYTES, None)
    }

    pub fn with_max_upload_bytes(max_upload_bytes: usize) -> Self {
        Self::build(max_upload_bytes, None)
    }

    /// Stores the gallery document in `backend` instead of the temporary directory
    pub fn with_document_backend(backend: Arc<dyn DocumentBackend>) -> Self {
        Self::build(TEST_MAX_UPLOAD_BYTES, Some(backend))
    }

    fn build(max_upload_bytes: usize, backend: Option<Arc<dyn DocumentBackend>>) -> Self {
        setup_test_env();

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let gallery_path = temp_dir.path().join("data").join("gallery.json");
        let public_dir = temp_dir.path().join("public");
        let uploads_dir = public_dir.join(UPLOADS_DIR);

        let backend = backend.unwrap_or_else(|| {
            Arc::new(LocalFileBackend::new(&gallery_path)) as Arc<dyn DocumentBackend>
        });
        let gallery_store = Arc::new(GalleryStore::new(backend));
        let media_storage = Arc::new(MediaStorage::new(
            Arc::new(LocalMediaBackend::new(&public_dir)),
            max_upload_bytes,
            FileNaming::Timestamp,
        ));

        let router = server::router(
            Environment::Development,
            gallery_store,
            media_storage,
            Some(uploads_dir.clone()),
        );

        Self {
            router,
            gallery_path,
            uploads_dir,
            _temp_dir: temp_dir,
        }
    }

    pub async fn send_request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router should not fail")
    }

    pub async fn send_get_request(&self, route: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())
            .unwrap();
        self.send_request(request).await
    }

    pub async fn send_json_request(
        &self,
        method: &str,
        route: &str,
        payload: serde_json::Value,
    ) -> Response {
        let request = Request::builder()
            .uri(route)
            .method(method)
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        self.send_request(request).await
    }

    pub async fn send_multipart_request(&self, route: &str, parts: &[Part<'_>]) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send_request(request).await
    }

    /// Names of the files currently stored in the uploads directory
    pub fn stored_uploads(&self) -> Vec<String> {
        std::fs::read_dir(&self.uploads_dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }
}
