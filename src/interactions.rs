use crate::database::models::{
    CommentRecord, FollowRecord, LikeRecord, NotificationRecord, NOTIFICATION_COMMENT,
    NOTIFICATION_FOLLOW, NOTIFICATION_LIKE,
};
use crate::database::repositories::{
    CommentRepository, FollowRepository, LikeRepository, NotificationRepository, PostRepository,
    ProfileRepository, SqliteRepositories,
};
use crate::database::Database;
use crate::profiles::ProfileSummary;
use crate::utils::now_utc_iso;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone)]
pub struct InteractionService {
    database: Database,
}

impl InteractionService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Toggles the viewer's like on a post. The insert/delete itself decides
    /// the direction, so two racing requests cannot double-count. Returns
    /// `None` when the post does not exist.
    pub fn toggle_like(&self, viewer_id: &str, post_id: &str) -> Result<Option<LikeOutcome>> {
        self.database.with_repositories(|repos| {
            let Some(post) = repos.posts().get(post_id)? else {
                return Ok(None);
            };
            let likes = repos.likes();
            let inserted = likes.add(&LikeRecord {
                post_id: post_id.to_string(),
                user_id: viewer_id.to_string(),
                created_at: now_utc_iso(),
            })?;
            let liked = if inserted {
                notify(&repos, &post.user_id, viewer_id, NOTIFICATION_LIKE, Some(post_id), None);
                true
            } else {
                likes.remove(post_id, viewer_id)?;
                false
            };
            Ok(Some(LikeOutcome {
                liked,
                like_count: likes.count_for_post(post_id)?,
            }))
        })
    }

    /// Toggles whether the viewer follows `target_id`.
    pub fn toggle_follow(&self, viewer_id: &str, target_id: &str) -> Result<FollowOutcome> {
        if viewer_id == target_id {
            bail!("cannot follow yourself");
        }
        self.database.with_repositories(|repos| {
            if repos.profiles().get(target_id)?.is_none() {
                bail!("profile not found");
            }
            let follows = repos.follows();
            let inserted = follows.add(&FollowRecord {
                follower_id: viewer_id.to_string(),
                following_id: target_id.to_string(),
                created_at: now_utc_iso(),
            })?;
            let following = if inserted {
                notify(&repos, target_id, viewer_id, NOTIFICATION_FOLLOW, None, None);
                true
            } else {
                follows.remove(viewer_id, target_id)?;
                false
            };
            Ok(FollowOutcome {
                following,
                follower_count: follows.follower_count(target_id)?,
            })
        })
    }

    /// Adds a comment, or returns `None` when the post does not exist.
    pub fn add_comment(
        &self,
        viewer_id: &str,
        post_id: &str,
        content: &str,
    ) -> Result<Option<CommentView>> {
        let content = content.trim().to_string();
        if content.is_empty() {
            bail!("comment content may not be empty");
        }
        self.database.with_repositories(|repos| {
            let Some(post) = repos.posts().get(post_id)? else {
                return Ok(None);
            };
            let record = CommentRecord {
                id: Uuid::new_v4().to_string(),
                post_id: post_id.to_string(),
                user_id: viewer_id.to_string(),
                content,
                created_at: now_utc_iso(),
            };
            repos.comments().create(&record)?;
            notify(
                &repos,
                &post.user_id,
                viewer_id,
                NOTIFICATION_COMMENT,
                Some(post_id),
                Some(&record.id),
            );
            let author = repos
                .profiles()
                .get(viewer_id)?
                .map(ProfileSummary::from_record);
            Ok(Some(comment_view(record, author)))
        })
    }

    pub fn list_comments(&self, post_id: &str) -> Result<Option<Vec<CommentView>>> {
        self.database.with_repositories(|repos| {
            if repos.posts().get(post_id)?.is_none() {
                return Ok(None);
            }
            let records = repos.comments().list_for_post(post_id)?;
            let author_ids: Vec<String> = records.iter().map(|c| c.user_id.clone()).collect();
            let authors = repos.profiles().get_many(&author_ids)?;
            Ok(Some(
                records
                    .into_iter()
                    .map(|record| {
                        let author = authors
                            .get(&record.user_id)
                            .cloned()
                            .map(ProfileSummary::from_record);
                        comment_view(record, author)
                    })
                    .collect(),
            ))
        })
    }

    /// Deletes a post the viewer owns, together with its notifications.
    /// Likes and comments go with it via foreign keys.
    pub fn delete_post(&self, viewer_id: &str, post_id: &str) -> Result<DeleteOutcome> {
        self.database.with_repositories(|repos| {
            let Some(post) = repos.posts().get(post_id)? else {
                return Ok(DeleteOutcome::NotFound);
            };
            if post.user_id != viewer_id {
                return Ok(DeleteOutcome::Forbidden);
            }
            repos.notifications().delete_for_post(post_id)?;
            repos.posts().delete(post_id)?;
            Ok(DeleteOutcome::Deleted)
        })
    }

    pub fn delete_comment(&self, viewer_id: &str, comment_id: &str) -> Result<DeleteOutcome> {
        self.database.with_repositories(|repos| {
            let Some(comment) = repos.comments().get(comment_id)? else {
                return Ok(DeleteOutcome::NotFound);
            };
            if comment.user_id != viewer_id {
                return Ok(DeleteOutcome::Forbidden);
            }
            repos.comments().delete(comment_id)?;
            Ok(DeleteOutcome::Deleted)
        })
    }
}

/// Records a notification for `recipient`. Failures are logged and swallowed
/// so a notification hiccup never fails the interaction that caused it.
fn notify(
    repos: &SqliteRepositories<'_>,
    recipient_id: &str,
    actor_id: &str,
    kind: &str,
    post_id: Option<&str>,
    comment_id: Option<&str>,
) {
    if recipient_id == actor_id {
        return;
    }
    let record = NotificationRecord {
        id: Uuid::new_v4().to_string(),
        user_id: recipient_id.to_string(),
        actor_id: actor_id.to_string(),
        kind: kind.to_string(),
        post_id: post_id.map(str::to_string),
        comment_id: comment_id.map(str::to_string),
        read: false,
        created_at: now_utc_iso(),
    };
    if let Err(err) = repos.notifications().create(&record) {
        tracing::warn!(kind, recipient_id, "failed to record notification: {err:#}");
    }
}

fn comment_view(record: CommentRecord, author: Option<ProfileSummary>) -> CommentView {
    CommentView {
        id: record.id,
        post_id: record.post_id,
        user_id: record.user_id,
        content: record.content,
        created_at: record.created_at,
        author,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
    pub author: Option<ProfileSummary>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub like_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FollowOutcome {
    pub following: bool,
    pub follower_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Forbidden,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{PostRecord, ProfileRecord};
    use rusqlite::Connection;

    fn setup() -> (InteractionService, Database) {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");
        (InteractionService::new(db.clone()), db)
    }

    fn seed_profile(db: &Database, id: &str) {
        db.with_repositories(|repos| {
            repos.profiles().create(&ProfileRecord {
                id: id.into(),
                username: id.into(),
                display_name: None,
                bio: None,
                avatar_url: None,
                email: None,
                role: crate::auth::ROLE_MEMBER.into(),
                created_at: "2024-01-01T00:00:00Z".into(),
                updated_at: None,
            })
        })
        .expect("seed profile");
    }

    fn seed_post(db: &Database, author: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.with_repositories(|repos| {
            repos.posts().create(&PostRecord {
                id: id.clone(),
                user_id: author.into(),
                content: "hello".into(),
                image_url: None,
                created_at: "2024-01-02T00:00:00Z".into(),
            })
        })
        .expect("seed post");
        id
    }

    fn notifications_for(db: &Database, user: &str) -> Vec<NotificationRecord> {
        db.with_repositories(|repos| repos.notifications().list_for_user(user, 50))
            .expect("list notifications")
    }

    #[test]
    fn like_toggles_back_and_forth() {
        let (service, db) = setup();
        seed_profile(&db, "alice");
        seed_profile(&db, "bob");
        let post_id = seed_post(&db, "bob");

        let first = service
            .toggle_like("alice", &post_id)
            .expect("like")
            .expect("post exists");
        assert!(first.liked);
        assert_eq!(first.like_count, 1);

        let second = service
            .toggle_like("alice", &post_id)
            .expect("unlike")
            .expect("post exists");
        assert!(!second.liked);
        assert_eq!(second.like_count, 0);
    }

    #[test]
    fn like_notifies_the_author_but_not_yourself() {
        let (service, db) = setup();
        seed_profile(&db, "alice");
        seed_profile(&db, "bob");
        let bobs_post = seed_post(&db, "bob");
        let own_post = seed_post(&db, "alice");

        service
            .toggle_like("alice", &bobs_post)
            .expect("like bob")
            .expect("post exists");
        service
            .toggle_like("alice", &own_post)
            .expect("like self")
            .expect("post exists");

        let bobs = notifications_for(&db, "bob");
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].kind, NOTIFICATION_LIKE);
        assert_eq!(bobs[0].actor_id, "alice");
        assert_eq!(bobs[0].post_id.as_deref(), Some(bobs_post.as_str()));
        assert!(notifications_for(&db, "alice").is_empty());
    }

    #[test]
    fn unlike_keeps_the_notification() {
        let (service, db) = setup();
        seed_profile(&db, "alice");
        seed_profile(&db, "bob");
        let post_id = seed_post(&db, "bob");

        service
            .toggle_like("alice", &post_id)
            .expect("like")
            .expect("post exists");
        service
            .toggle_like("alice", &post_id)
            .expect("unlike")
            .expect("post exists");
        assert_eq!(notifications_for(&db, "bob").len(), 1);
    }

    #[test]
    fn interactions_on_a_missing_post_report_absence() {
        let (service, db) = setup();
        seed_profile(&db, "alice");

        assert!(service
            .toggle_like("alice", "missing")
            .expect("toggle")
            .is_none());
        assert!(service
            .add_comment("alice", "missing", "hi")
            .expect("comment")
            .is_none());
    }

    #[test]
    fn follow_toggles_and_rejects_self_follow() {
        let (service, db) = setup();
        seed_profile(&db, "alice");
        seed_profile(&db, "bob");

        let first = service.toggle_follow("alice", "bob").expect("follow");
        assert!(first.following);
        assert_eq!(first.follower_count, 1);

        let second = service.toggle_follow("alice", "bob").expect("unfollow");
        assert!(!second.following);
        assert_eq!(second.follower_count, 0);

        assert!(service.toggle_follow("alice", "alice").is_err());
        let bobs = notifications_for(&db, "bob");
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].kind, NOTIFICATION_FOLLOW);
    }

    #[test]
    fn comments_are_validated_and_notify_the_author() {
        let (service, db) = setup();
        seed_profile(&db, "alice");
        seed_profile(&db, "bob");
        let post_id = seed_post(&db, "bob");

        assert!(service.add_comment("alice", &post_id, "   ").is_err());

        let comment = service
            .add_comment("alice", &post_id, " nice post ")
            .expect("comment")
            .expect("post exists");
        assert_eq!(comment.content, "nice post");
        assert_eq!(
            comment.author.as_ref().map(|a| a.username.as_str()),
            Some("alice")
        );

        let bobs = notifications_for(&db, "bob");
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].kind, NOTIFICATION_COMMENT);
        assert_eq!(bobs[0].comment_id.as_deref(), Some(comment.id.as_str()));

        let listed = service
            .list_comments(&post_id)
            .expect("list")
            .expect("post exists");
        assert_eq!(listed.len(), 1);
        assert!(service.list_comments("missing").expect("list").is_none());
    }

    #[test]
    fn only_the_owner_may_delete_a_post() {
        let (service, db) = setup();
        seed_profile(&db, "alice");
        seed_profile(&db, "bob");
        let post_id = seed_post(&db, "bob");

        assert_eq!(
            service.delete_post("alice", &post_id).expect("delete"),
            DeleteOutcome::Forbidden
        );
        assert_eq!(
            service.delete_post("bob", &post_id).expect("delete"),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            service.delete_post("bob", &post_id).expect("delete"),
            DeleteOutcome::NotFound
        );
    }

    #[test]
    fn deleting_a_post_clears_its_notifications() {
        let (service, db) = setup();
        seed_profile(&db, "alice");
        seed_profile(&db, "bob");
        let post_id = seed_post(&db, "bob");
        service
            .toggle_like("alice", &post_id)
            .expect("like")
            .expect("post exists");
        service
            .add_comment("alice", &post_id, "hi")
            .expect("comment")
            .expect("post exists");
        assert_eq!(notifications_for(&db, "bob").len(), 2);

        service.delete_post("bob", &post_id).expect("delete");
        assert!(notifications_for(&db, "bob").is_empty());
    }

    #[test]
    fn only_the_owner_may_delete_a_comment() {
        let (service, db) = setup();
        seed_profile(&db, "alice");
        seed_profile(&db, "bob");
        let post_id = seed_post(&db, "bob");
        let comment = service
            .add_comment("alice", &post_id, "hi")
            .expect("comment")
            .expect("post exists");

        assert_eq!(
            service.delete_comment("bob", &comment.id).expect("delete"),
            DeleteOutcome::Forbidden
        );
        assert_eq!(
            service.delete_comment("alice", &comment.id).expect("delete"),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            service.delete_comment("alice", &comment.id).expect("delete"),
            DeleteOutcome::NotFound
        );
    }
}
