use super::{optional_viewer, ApiResult, AppState};
use crate::feed::PostView;
use crate::profiles::ProfileSummary;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    q: String,
    #[serde(default = "default_search_limit")]
    limit: Option<usize>,
}

pub(crate) fn default_search_limit() -> Option<usize> {
    Some(10)
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchResponse {
    pub posts: Vec<PostView>,
    pub people: Vec<ProfileSummary>,
    pub query: String,
}

pub(crate) async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> ApiResult<SearchResponse> {
    use crate::database::repositories::SearchRepository;

    let query = params.q.trim().to_string();
    let limit = params.limit.unwrap_or(10).min(50);

    if query.is_empty() {
        return Ok(Json(SearchResponse {
            posts: Vec::new(),
            people: Vec::new(),
            query,
        }));
    }

    let viewer = optional_viewer(&state, &headers)?;
    let (post_records, profile_records) = state.database.with_repositories(|repos| {
        let search = repos.search();
        Ok((
            search.search_posts(&query, limit)?,
            search.search_profiles(&query, limit)?,
        ))
    })?;

    let posts = state
        .feed()
        .enrich(post_records, viewer.as_ref().map(|v| v.id.as_str()))?;
    let people = profile_records
        .into_iter()
        .map(ProfileSummary::from_record)
        .collect();

    Ok(Json(SearchResponse { posts, people, query }))
}
