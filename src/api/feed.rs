use super::{require_viewer, ApiError, ApiResult, AppState};
use crate::feed::{FeedCursor, FeedPage, DEFAULT_FEED_LIMIT};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct FeedParams {
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

pub(crate) async fn get_feed(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
    headers: HeaderMap,
) -> ApiResult<FeedPage> {
    let viewer = require_viewer(&state, &headers)?;
    let cursor = match params.cursor.as_deref() {
        Some(token) => Some(
            FeedCursor::decode(token)
                .ok_or_else(|| ApiError::BadRequest("malformed feed cursor".into()))?,
        ),
        None => None,
    };
    let limit = params.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    Ok(Json(state.feed().compose_feed(&viewer.id, cursor, limit)?))
}
