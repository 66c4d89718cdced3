//! Route definitions for the `/slots` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::slot;
use crate::state::AppState;

/// Routes mounted at `/slots`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(slot::list).post(slot::create))
        .route("/{id}", put(slot::update).delete(slot::delete))
}
