use crate::database::models::PostRecord;
use crate::database::repositories::{
    CommentRepository, FollowRepository, LikeRepository, PostRepository, ProfileRepository,
    SqliteRepositories,
};
use crate::database::Database;
use anyhow::{bail, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FEED_LIMIT: usize = 20;
pub const MAX_FEED_LIMIT: usize = 100;

#[derive(Clone)]
pub struct FeedService {
    database: Database,
}

impl FeedService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Composes the home feed for `viewer_id`: their own posts plus posts by
    /// everyone they follow, newest first. Pagination is keyset-based on
    /// `(created_at, id)` so concurrent inserts never shift a page.
    pub fn compose_feed(
        &self,
        viewer_id: &str,
        cursor: Option<FeedCursor>,
        limit: usize,
    ) -> Result<FeedPage> {
        let limit = limit.clamp(1, MAX_FEED_LIMIT);
        self.database.with_repositories(|repos| {
            let mut authors = repos.follows().following_ids(viewer_id)?;
            authors.push(viewer_id.to_string());

            let before = cursor
                .as_ref()
                .map(|c| (c.created_at.as_str(), c.id.as_str()));
            // One extra row tells us whether another page exists.
            let mut records = repos.posts().list_for_authors(&authors, before, limit + 1)?;
            let has_more = records.len() > limit;
            records.truncate(limit);

            let next_cursor = if has_more {
                records.last().map(|post| FeedCursor {
                    created_at: post.created_at.clone(),
                    id: post.id.clone(),
                })
            } else {
                None
            };
            let posts = enrich_posts(&repos, records, Some(viewer_id))?;
            Ok(FeedPage { posts, next_cursor })
        })
    }

    pub fn get_post(&self, post_id: &str, viewer_id: Option<&str>) -> Result<Option<PostView>> {
        self.database.with_repositories(|repos| {
            let Some(record) = repos.posts().get(post_id)? else {
                return Ok(None);
            };
            let mut views = enrich_posts(&repos, vec![record], viewer_id)?;
            Ok(views.pop())
        })
    }

    pub fn create_post(&self, author_id: &str, input: CreatePostInput) -> Result<PostView> {
        let content = input.content.trim().to_string();
        if content.is_empty() {
            bail!("post content may not be empty");
        }
        let record = PostRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: author_id.to_string(),
            content,
            image_url: input.image_url,
            created_at: crate::utils::now_utc_iso(),
        };
        self.database.with_repositories(|repos| {
            repos.posts().create(&record)?;
            let mut views = enrich_posts(&repos, vec![record], Some(author_id))?;
            views.pop().ok_or_else(|| anyhow::anyhow!("post view missing after create"))
        })
    }

    pub fn list_for_user(
        &self,
        profile_id: &str,
        viewer_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<PostView>> {
        let limit = limit.clamp(1, MAX_FEED_LIMIT);
        self.database.with_repositories(|repos| {
            let records = repos.posts().list_for_user(profile_id, limit)?;
            enrich_posts(&repos, records, viewer_id)
        })
    }

    /// Hydrates raw post rows with author profiles, counts, and the viewer's
    /// like state. Shared with search so both surfaces render identically.
    pub fn enrich(&self, records: Vec<PostRecord>, viewer_id: Option<&str>) -> Result<Vec<PostView>> {
        self.database
            .with_repositories(|repos| enrich_posts(&repos, records, viewer_id))
    }
}

fn enrich_posts(
    repos: &SqliteRepositories<'_>,
    records: Vec<PostRecord>,
    viewer_id: Option<&str>,
) -> Result<Vec<PostView>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let post_ids: Vec<String> = records.iter().map(|post| post.id.clone()).collect();
    let author_ids: Vec<String> = records.iter().map(|post| post.user_id.clone()).collect();

    let authors = repos.profiles().get_many(&author_ids)?;
    let like_counts = repos.likes().count_for_posts(&post_ids)?;
    let comment_counts = repos.comments().count_for_posts(&post_ids)?;
    let liked = match viewer_id {
        Some(viewer) => repos.likes().liked_by_user(&post_ids, viewer)?,
        None => Default::default(),
    };

    Ok(records
        .into_iter()
        .map(|post| {
            let author = authors
                .get(&post.user_id)
                .cloned()
                .map(crate::profiles::ProfileSummary::from_record);
            PostView {
                like_count: like_counts.get(&post.id).copied().unwrap_or(0),
                comment_count: comment_counts.get(&post.id).copied().unwrap_or(0),
                viewer_has_liked: liked.contains(&post.id),
                id: post.id,
                user_id: post.user_id,
                content: post.content,
                image_url: post.image_url,
                created_at: post.created_at,
                author,
            }
        })
        .collect())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: String,
    pub author: Option<crate::profiles::ProfileSummary>,
    pub like_count: i64,
    pub comment_count: i64,
    pub viewer_has_liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub posts: Vec<PostView>,
    pub next_cursor: Option<FeedCursor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Opaque pagination token for the feed. Encodes the `(created_at, id)` of
/// the last post on the previous page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCursor {
    pub created_at: String,
    pub id: String,
}

impl FeedCursor {
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}\n{}", self.created_at, self.id))
    }

    pub fn decode(token: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(token).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        let (created_at, id) = text.split_once('\n')?;
        if created_at.is_empty() || id.is_empty() {
            return None;
        }
        Some(Self {
            created_at: created_at.to_string(),
            id: id.to_string(),
        })
    }
}

impl Serialize for FeedCursor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for FeedCursor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        FeedCursor::decode(&token)
            .ok_or_else(|| serde::de::Error::custom("malformed feed cursor"))
    }
}
