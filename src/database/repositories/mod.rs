mod comments;
mod follows;
mod likes;
mod notifications;
mod posts;
mod profiles;
mod search;
mod sessions;
mod stats;

use super::models::{
    CommentRecord, FollowRecord, LikeRecord, NotificationRecord, PostRecord, ProfileRecord,
    SessionRecord, StatsRecord,
};
use anyhow::Result;
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};

pub trait ProfileRepository {
    fn create(&self, record: &ProfileRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<ProfileRecord>>;
    fn get_by_username(&self, username: &str) -> Result<Option<ProfileRecord>>;
    /// Batch fetch keyed by profile id; missing ids are simply absent.
    fn get_many(&self, ids: &[String]) -> Result<HashMap<String, ProfileRecord>>;
    /// Updates the mutable profile fields. The username is immutable and
    /// deliberately not part of this statement.
    fn update_details(
        &self,
        id: &str,
        display_name: Option<&str>,
        bio: Option<&str>,
        avatar_url: Option<&str>,
        updated_at: &str,
    ) -> Result<bool>;
    fn set_role(&self, id: &str, role: &str) -> Result<bool>;
    fn list_recent(&self, limit: usize) -> Result<Vec<ProfileRecord>>;
}

pub trait SessionRepository {
    fn create(&self, record: &SessionRecord) -> Result<()>;
    fn user_for_token(&self, token: &str) -> Result<Option<String>>;
}

pub trait FollowRepository {
    /// Inserts the edge if absent. Returns true when a row was written, so
    /// the caller learns the toggle direction from the statement itself.
    fn add(&self, record: &FollowRecord) -> Result<bool>;
    fn remove(&self, follower_id: &str, following_id: &str) -> Result<bool>;
    fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool>;
    fn following_ids(&self, follower_id: &str) -> Result<Vec<String>>;
    fn follower_count(&self, user_id: &str) -> Result<i64>;
    fn following_count(&self, user_id: &str) -> Result<i64>;
}

pub trait PostRepository {
    fn create(&self, record: &PostRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<PostRecord>>;
    fn delete(&self, id: &str) -> Result<bool>;
    /// Feed page: posts by any of the given authors, newest first, keyset
    /// filtered by an exclusive `(created_at, id)` upper bound.
    fn list_for_authors(
        &self,
        author_ids: &[String],
        before: Option<(&str, &str)>,
        limit: usize,
    ) -> Result<Vec<PostRecord>>;
    fn list_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<PostRecord>>;
    fn count_for_user(&self, user_id: &str) -> Result<i64>;
}

pub trait LikeRepository {
    /// `INSERT OR IGNORE`; returns whether a row was inserted.
    fn add(&self, record: &LikeRecord) -> Result<bool>;
    fn remove(&self, post_id: &str, user_id: &str) -> Result<bool>;
    fn count_for_post(&self, post_id: &str) -> Result<i64>;
    fn count_for_posts(&self, post_ids: &[String]) -> Result<HashMap<String, i64>>;
    /// Which of the given posts the user has liked.
    fn liked_by_user(&self, post_ids: &[String], user_id: &str) -> Result<HashSet<String>>;
}

pub trait CommentRepository {
    fn create(&self, record: &CommentRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<CommentRecord>>;
    fn delete(&self, id: &str) -> Result<bool>;
    fn list_for_post(&self, post_id: &str) -> Result<Vec<CommentRecord>>;
    fn count_for_post(&self, post_id: &str) -> Result<i64>;
    fn count_for_posts(&self, post_ids: &[String]) -> Result<HashMap<String, i64>>;
}

pub trait NotificationRepository {
    fn create(&self, record: &NotificationRecord) -> Result<()>;
    fn list_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<NotificationRecord>>;
    /// Bulk-flips every unread notification for the user; returns how many
    /// rows changed so repeat calls can be observed as no-ops.
    fn mark_all_read(&self, user_id: &str) -> Result<usize>;
    fn count_unread(&self, user_id: &str) -> Result<i64>;
    fn delete_for_post(&self, post_id: &str) -> Result<usize>;
}

pub trait SearchRepository {
    fn search_posts(&self, query: &str, limit: usize) -> Result<Vec<PostRecord>>;
    fn search_profiles(&self, query: &str, limit: usize) -> Result<Vec<ProfileRecord>>;
}

pub trait StatsRepository {
    fn totals(&self) -> Result<StatsRecord>;
}

pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn profiles(&self) -> impl ProfileRepository + '_ {
        profiles::SqliteProfileRepository { conn: self.conn }
    }

    pub fn sessions(&self) -> impl SessionRepository + '_ {
        sessions::SqliteSessionRepository { conn: self.conn }
    }

    pub fn follows(&self) -> impl FollowRepository + '_ {
        follows::SqliteFollowRepository { conn: self.conn }
    }

    pub fn posts(&self) -> impl PostRepository + '_ {
        posts::SqlitePostRepository { conn: self.conn }
    }

    pub fn likes(&self) -> impl LikeRepository + '_ {
        likes::SqliteLikeRepository { conn: self.conn }
    }

    pub fn comments(&self) -> impl CommentRepository + '_ {
        comments::SqliteCommentRepository { conn: self.conn }
    }

    pub fn notifications(&self) -> impl NotificationRepository + '_ {
        notifications::SqliteNotificationRepository { conn: self.conn }
    }

    pub fn search(&self) -> impl SearchRepository + '_ {
        search::SqliteSearchRepository { conn: self.conn }
    }

    pub fn stats(&self) -> impl StatsRepository + '_ {
        stats::SqliteStatsRepository { conn: self.conn }
    }
}
