use axum::{extract::State, Json};

use crate::config::Permission;
use crate::tracker::{TrackerMode, TrackerStatus};
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AppState, AuthenticatedUser};

#[utoipa::path(
    get,
    path = "/api/tracker/mode",
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Tracker mode", body = TrackerMode),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "tracker"
)]
pub async fn mode(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<TrackerMode>> {
    require_permission(&user, Permission::ReadStatus)?;
    let status = state.status.read().await;
    Ok(Json(status.mode))
}

#[utoipa::path(
    get,
    path = "/api/tracker/status",
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Latest tracker snapshot", body = TrackerStatus),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "tracker"
)]
pub async fn status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<TrackerStatus>> {
    require_permission(&user, Permission::ReadStatus)?;
    let status = state.status.read().await;
    Ok(Json(status.clone()))
}
