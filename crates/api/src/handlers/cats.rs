//! Handlers for the `/cats` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use chassis_core::error::CoreError;
use chassis_core::types::DocId;
use chassis_db::models::cat::{Cat, CreateCat, UpdateCat};
use chassis_db::repositories::{clamp_limit, clamp_offset, CatStore};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Build the 404 for a missing cat.
fn cat_not_found(id: DocId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Cat", id })
}

// ---------------------------------------------------------------------------
// GET /cats
// ---------------------------------------------------------------------------

/// List cats with pagination.
pub async fn list_cats(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);
    let items = state.cats.find_all(limit, offset).await?;
    tracing::debug!(count = items.len(), user = %auth.0.user_name, "Listed cats");
    Ok(Json(DataResponse { data: items }))
}

// ---------------------------------------------------------------------------
// POST /cats
// ---------------------------------------------------------------------------

/// Create a new cat.
pub async fn create_cat(
    State(state): State<AppState>,
    Json(input): Json<CreateCat>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let created = state.cats.create(&input).await?;
    tracing::info!(id = %created.id, "Cat created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// GET /cats/{id}
// ---------------------------------------------------------------------------

/// Get a single cat by id.
pub async fn get_cat(
    State(state): State<AppState>,
    Path(id): Path<DocId>,
) -> AppResult<Json<DataResponse<Cat>>> {
    let cat = state
        .cats
        .find_by_id(id)
        .await?
        .ok_or_else(|| cat_not_found(id))?;
    Ok(Json(DataResponse { data: cat }))
}

// ---------------------------------------------------------------------------
// PATCH /cats/{id}
// ---------------------------------------------------------------------------

/// Partially update a cat. Omitted fields are left untouched.
pub async fn update_cat(
    State(state): State<AppState>,
    Path(id): Path<DocId>,
    Json(input): Json<UpdateCat>,
) -> AppResult<Json<DataResponse<Cat>>> {
    input.validate()?;
    let updated = state
        .cats
        .update(id, &input)
        .await?
        .ok_or_else(|| cat_not_found(id))?;
    tracing::info!(id = %updated.id, "Cat updated");
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// DELETE /cats/{id}
// ---------------------------------------------------------------------------

/// Delete a cat. Returns 204 No Content.
pub async fn delete_cat(
    State(state): State<AppState>,
    Path(id): Path<DocId>,
) -> AppResult<StatusCode> {
    state
        .cats
        .delete(id)
        .await?
        .ok_or_else(|| cat_not_found(id))?;
    tracing::info!(%id, "Cat deleted");
    Ok(StatusCode::NO_CONTENT)
}
