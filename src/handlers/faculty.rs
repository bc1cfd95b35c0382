// Faculty record routes: /api/faculty
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthAdmin;
use crate::services::NewFaculty;
use crate::state::AppState;

/// POST /api/faculty - create a faculty profile plus its login account.
pub async fn faculty_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
    Json(input): Json<NewFaculty>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let faculty = state.faculty_service().create_faculty(auth.id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": faculty })),
    ))
}

/// GET /api/faculty - faculty records created by the caller.
pub async fn faculty_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
) -> Result<Json<Value>, ApiError> {
    let faculty = state.faculty_service().list_faculty(auth.id).await?;
    Ok(Json(json!({ "success": true, "data": faculty })))
}

/// GET /api/faculty/:id - single faculty record behind the gate.
pub async fn faculty_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let faculty = state.faculty_service().get_faculty(auth.id, id).await?;
    Ok(Json(json!({ "success": true, "data": faculty })))
}
