use super::{require_viewer, ApiError, ApiResult, AppState};
use crate::admin::AdminStats;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

pub(crate) async fn get_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<AdminStats> {
    let viewer = require_viewer(&state, &headers)?;
    if !state.admin_policy.is_admin(&viewer)? {
        return Err(ApiError::Forbidden("admin access required".into()));
    }
    let limit = state.config.admin.recent_users_limit;
    Ok(Json(state.admin().compute_stats(limit)?))
}
