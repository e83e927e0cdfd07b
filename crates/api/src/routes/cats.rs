//! Route definitions for the `/cats` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::cats;
use crate::state::AppState;

/// Routes mounted at `/cats`.
///
/// ```text
/// GET    /        -> list (paginated)
/// POST   /        -> create
/// GET    /{id}    -> get
/// PATCH  /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cats::list_cats).post(cats::create_cat))
        .route(
            "/{id}",
            get(cats::get_cat)
                .patch(cats::update_cat)
                .delete(cats::delete_cat),
        )
}
