use super::{optional_viewer, require_viewer, ApiError, ApiResult, AppState};
use crate::feed::{PostView, DEFAULT_FEED_LIMIT};
use crate::interactions::FollowOutcome;
use crate::profiles::{
    CreateProfileInput, ProfileSummary, ProfileView, ProvisionedProfile, UpdateProfileInput,
};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

pub(crate) async fn create_profile(
    State(state): State<AppState>,
    Json(input): Json<CreateProfileInput>,
) -> ApiResult<ProvisionedProfile> {
    let username = input.username.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("username may not be empty".into()));
    }
    let service = state.profiles();
    if service.username_taken(username)? {
        return Err(ApiError::BadRequest(format!(
            "username '{username}' is already taken"
        )));
    }
    Ok(Json(service.create_profile(input)?))
}

pub(crate) async fn get_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<ProfileView> {
    let viewer = optional_viewer(&state, &headers)?;
    let view = state
        .profiles()
        .get_profile_view(&profile_id, viewer.as_ref().map(|v| v.id.as_str()))?
        .ok_or_else(|| ApiError::NotFound(format!("profile {profile_id} not found")))?;
    Ok(Json(view))
}

pub(crate) async fn update_own_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<UpdateProfileInput>,
) -> ApiResult<ProfileSummary> {
    let viewer = require_viewer(&state, &headers)?;
    Ok(Json(state.profiles().update_profile(&viewer.id, input)?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfilePostsParams {
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfilePostsResponse {
    posts: Vec<PostView>,
}

pub(crate) async fn list_profile_posts(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Query(params): Query<ProfilePostsParams>,
    headers: HeaderMap,
) -> ApiResult<ProfilePostsResponse> {
    let viewer = optional_viewer(&state, &headers)?;
    if state.profiles().get_profile_view(&profile_id, None)?.is_none() {
        return Err(ApiError::NotFound(format!("profile {profile_id} not found")));
    }
    let posts = state.feed().list_for_user(
        &profile_id,
        viewer.as_ref().map(|v| v.id.as_str()),
        params.limit.unwrap_or(DEFAULT_FEED_LIMIT),
    )?;
    Ok(Json(ProfilePostsResponse { posts }))
}

pub(crate) async fn toggle_follow(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<FollowOutcome> {
    let viewer = require_viewer(&state, &headers)?;
    if viewer.id == profile_id {
        return Err(ApiError::BadRequest("cannot follow yourself".into()));
    }
    if state.profiles().get_profile_view(&profile_id, None)?.is_none() {
        return Err(ApiError::NotFound(format!("profile {profile_id} not found")));
    }
    Ok(Json(state.interactions().toggle_follow(&viewer.id, &profile_id)?))
}
