//! Route definitions for the `/animal` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, put};
use axum::Router;

use crate::handlers::animal;
use crate::state::AppState;

/// Routes for animals.
///
/// ```text
/// GET    /animal                 -> list
/// POST   /animal                 -> create
/// HEAD   /animal/{id}            -> exists
/// GET    /animal/{id}            -> get_by_id
/// PUT    /animal/{id}            -> update
/// DELETE /animal/{id}            -> delete
/// PUT    /animal/{id}/image      -> add_image
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/animal", get(animal::list).post(animal::create))
        .route(
            "/animal/{id}",
            get(animal::get_by_id)
                .head(animal::exists)
                .put(animal::update)
                .delete(animal::delete),
        )
        .route(
            "/animal/{id}/image",
            put(animal::add_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}
