pub mod animal;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree.
///
/// Route hierarchy:
///
/// ```text
/// /animal                  list, create
/// /animal/{id}             exists (HEAD), get, update, delete
/// /animal/{id}/image       add image (multipart PUT)
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().merge(animal::router(max_upload_bytes))
}
