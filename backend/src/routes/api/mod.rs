pub mod gallery;
pub mod upload;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

/// Creates the router for the gallery admin and public API
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/api/gallery",
            get(gallery::list_entries)
                .post(gallery::add_entry)
                .delete(gallery::remove_entry),
        )
        .api_route("/api/upload", post(upload::upload_image))
}
