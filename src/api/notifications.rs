use super::{require_viewer, ApiResult, AppState};
use crate::notifications::{NotificationView, DEFAULT_NOTIFICATION_LIMIT};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationParams {
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NotificationsResponse {
    notifications: Vec<NotificationView>,
}

pub(crate) async fn list_notifications(
    State(state): State<AppState>,
    Query(params): Query<NotificationParams>,
    headers: HeaderMap,
) -> ApiResult<NotificationsResponse> {
    let viewer = require_viewer(&state, &headers)?;
    let limit = params.limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT);
    let notifications = state.notifications().list_and_mark_read(&viewer.id, limit)?;
    Ok(Json(NotificationsResponse { notifications }))
}

#[derive(Debug, Serialize)]
pub(crate) struct UnreadCountResponse {
    unread: i64,
}

pub(crate) async fn unread_count(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<UnreadCountResponse> {
    let viewer = require_viewer(&state, &headers)?;
    Ok(Json(UnreadCountResponse {
        unread: state.notifications().unread_count(&viewer.id)?,
    }))
}
