// Visible-set routes: /api/users
use axum::{extract::State, response::Json, Extension};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthAdmin;
use crate::state::AppState;

/// GET /api/users - everything the caller may enumerate: created users
/// partitioned by role plus created faculty profiles.
pub async fn users_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
) -> Result<Json<Value>, ApiError> {
    let visible = state.admin_service().visible_users(auth.id).await?;
    Ok(Json(json!({
        "success": true,
        "data": {
            "admins": visible.admins,
            "faculty_users": visible.faculty_users,
            "faculty": visible.faculty,
        }
    })))
}
