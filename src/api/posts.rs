use super::{optional_viewer, require_viewer, ApiError, ApiResult, AppState};
use crate::feed::{CreatePostInput, PostView};
use crate::interactions::{CommentView, DeleteOutcome, LikeOutcome};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

pub(crate) async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreatePostInput>,
) -> ApiResult<PostView> {
    let viewer = require_viewer(&state, &headers)?;
    if input.content.trim().is_empty() {
        return Err(ApiError::BadRequest("post content may not be empty".into()));
    }
    Ok(Json(state.feed().create_post(&viewer.id, input)?))
}

pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<PostView> {
    let viewer = optional_viewer(&state, &headers)?;
    let post = state
        .feed()
        .get_post(&post_id, viewer.as_ref().map(|v| v.id.as_str()))?
        .ok_or_else(|| ApiError::NotFound(format!("post {post_id} not found")))?;
    Ok(Json(post))
}

#[derive(Debug, Serialize)]
pub(crate) struct DeletedResponse {
    deleted: bool,
}

fn map_delete(outcome: DeleteOutcome, what: &str) -> Result<Json<DeletedResponse>, ApiError> {
    match outcome {
        DeleteOutcome::Deleted => Ok(Json(DeletedResponse { deleted: true })),
        DeleteOutcome::NotFound => Err(ApiError::NotFound(format!("{what} not found"))),
        DeleteOutcome::Forbidden => {
            Err(ApiError::Forbidden(format!("only the owner may delete this {what}")))
        }
    }
}

pub(crate) async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<DeletedResponse> {
    let viewer = require_viewer(&state, &headers)?;
    map_delete(state.interactions().delete_post(&viewer.id, &post_id)?, "post")
}

pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<LikeOutcome> {
    let viewer = require_viewer(&state, &headers)?;
    let outcome = state
        .interactions()
        .toggle_like(&viewer.id, &post_id)?
        .ok_or_else(|| ApiError::NotFound(format!("post {post_id} not found")))?;
    Ok(Json(outcome))
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentsResponse {
    comments: Vec<CommentView>,
}

pub(crate) async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<CommentsResponse> {
    let comments = state
        .interactions()
        .list_comments(&post_id)?
        .ok_or_else(|| ApiError::NotFound(format!("post {post_id} not found")))?;
    Ok(Json(CommentsResponse { comments }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateCommentInput {
    content: String,
}

pub(crate) async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<CreateCommentInput>,
) -> ApiResult<CommentView> {
    let viewer = require_viewer(&state, &headers)?;
    if input.content.trim().is_empty() {
        return Err(ApiError::BadRequest("comment content may not be empty".into()));
    }
    let comment = state
        .interactions()
        .add_comment(&viewer.id, &post_id, &input.content)?
        .ok_or_else(|| ApiError::NotFound(format!("post {post_id} not found")))?;
    Ok(Json(comment))
}

pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<DeletedResponse> {
    let viewer = require_viewer(&state, &headers)?;
    map_delete(
        state.interactions().delete_comment(&viewer.id, &comment_id)?,
        "comment",
    )
}
