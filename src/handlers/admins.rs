// Sub-admin management routes: /api/admins
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::UserChanges;
use crate::error::ApiError;
use crate::middleware::AuthAdmin;
use crate::services::NewSubAdmin;
use crate::state::AppState;

/// POST /api/admins - create a sub-admin under the caller.
pub async fn admin_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
    Json(input): Json<NewSubAdmin>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user = state.admin_service().create_sub_admin(auth.id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": user })),
    ))
}

/// GET /api/admins - sub-admins directly created by the caller.
pub async fn admin_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
) -> Result<Json<Value>, ApiError> {
    let admins = state.admin_service().list_sub_admins(auth.id).await?;
    Ok(Json(json!({ "success": true, "data": admins })))
}

/// GET /api/admins/status - sub-admin creation status view.
pub async fn admin_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
) -> Result<Json<Value>, ApiError> {
    let status = state.admin_service().creation_status(auth.id).await?;
    Ok(Json(json!({ "success": true, "data": status })))
}

/// GET /api/admins/statistics - counters over the caller's created records.
pub async fn admin_statistics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
) -> Result<Json<Value>, ApiError> {
    let stats = state.admin_service().statistics(auth.id).await?;
    Ok(Json(json!({ "success": true, "data": stats })))
}

/// GET /api/admins/hierarchy - full descendant subtree (reporting view).
pub async fn admin_hierarchy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
) -> Result<Json<Value>, ApiError> {
    let admins = state.admin_service().hierarchy(auth.id).await?;
    Ok(Json(json!({ "success": true, "data": admins })))
}

/// GET /api/admins/:id - single sub-admin behind the visibility gate.
pub async fn admin_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let user = state.admin_service().get_sub_admin(auth.id, id).await?;
    Ok(Json(json!({ "success": true, "data": user })))
}

/// PUT /api/admins/:id - update profile fields of a sub-admin.
pub async fn admin_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
    Path(id): Path<Uuid>,
    Json(changes): Json<UserChanges>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .admin_service()
        .update_sub_admin(auth.id, id, changes)
        .await?;
    Ok(Json(json!({ "success": true, "data": user })))
}

/// DELETE /api/admins/:id - delete a sub-admin without created records.
pub async fn admin_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.admin_service().delete_sub_admin(auth.id, id).await?;
    Ok(Json(json!({ "success": true, "data": { "deleted": id } })))
}
