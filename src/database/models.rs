use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    /// Unique handle, immutable after creation.
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub role: String, // 'member' or 'admin'
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowRecord {
    pub follower_id: String,
    pub following_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeRecord {
    pub post_id: String,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
}

pub const NOTIFICATION_LIKE: &str = "like";
pub const NOTIFICATION_COMMENT: &str = "comment";
pub const NOTIFICATION_FOLLOW: &str = "follow";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    /// Recipient profile id.
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String, // 'like', 'comment', or 'follow'
    pub actor_id: String,
    pub post_id: Option<String>,
    pub comment_id: Option<String>,
    pub read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsRecord {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_comments: i64,
    pub total_follows: i64,
}
