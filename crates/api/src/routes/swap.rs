//! Route definitions for the marketplace and swap requests.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::swap;
use crate::state::AppState;

/// Routes merged at the `/api/v1` root.
///
/// ```text
/// GET  /swappable-slots         -> swappable
/// POST /swap-request            -> create_request
/// POST /swap-response/{id}      -> respond
/// GET  /swap-requests/me        -> my_requests
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/swappable-slots", get(swap::swappable))
        .route("/swap-request", post(swap::create_request))
        .route("/swap-response/{id}", post(swap::respond))
        .route("/swap-requests/me", get(swap::my_requests))
}
