use std::path::PathBuf;
use std::sync::Arc;

use aide::openapi::{Info, OpenApi};
use axum::{extract::DefaultBodyLimit, Extension, Router};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use gallery_storage::GalleryStore;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::routes;
use crate::{
    media_storage::{MediaStorage, UPLOADS_DIR},
    types::Environment,
};

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Builds the application router with its dependencies attached
///
/// When `uploads_dir` is set, files stored there are served under `/uploads`.
pub fn router(
    environment: Environment,
    gallery_store: Arc<GalleryStore>,
    media_storage: Arc<MediaStorage>,
    uploads_dir: Option<PathBuf>,
) -> Router {
    let mut openapi = OpenApi {
        info: Info {
            title: "Kayak Gallery Backend".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    let body_limit = media_storage.max_upload_bytes() + MULTIPART_OVERHEAD_BYTES;

    let router = routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(gallery_store))
        .layer(Extension(media_storage))
        .layer(DefaultBodyLimit::max(body_limit));

    match uploads_dir {
        Some(dir) => router.nest_service(&format!("/{UPLOADS_DIR}"), ServeDir::new(dir)),
        None => router,
    }
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    gallery_store: Arc<GalleryStore>,
    media_storage: Arc<MediaStorage>,
    uploads_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let router = router(environment, gallery_store, media_storage, uploads_dir)
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
        .layer(tower_http::timeout::TimeoutLayer::new(
            std::time::Duration::from_secs(30),
        ));

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🛶 Kayak Gallery Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}
