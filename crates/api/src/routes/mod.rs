pub mod auth;
pub mod cats;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                  health check (public)
///
/// /auth/login              login (public)
/// /auth/refresh            refresh (public)
/// /auth/logout             logout (requires auth)
///
/// /cats                    list, create
/// /cats/{id}               get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/cats", cats::router())
}
