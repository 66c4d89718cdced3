pub mod auth;
pub mod health;
pub mod slot;
pub mod swap;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                 register (public)
/// /auth/login                  login (public)
/// /auth/me                     current user
///
/// /slots                       list, create
/// /slots/{id}                  update, delete
///
/// /swappable-slots             marketplace
/// /swap-request                propose a swap
/// /swap-response/{id}          accept or reject
/// /swap-requests/me            incoming and outgoing requests
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/slots", slot::router())
        .merge(swap::router())
}
