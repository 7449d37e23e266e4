use crate::database::models::StatsRecord;
use crate::database::repositories::{ProfileRepository, StatsRepository};
use crate::database::Database;
use crate::profiles::ProfileSummary;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct AdminService {
    database: Database,
}

impl AdminService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn compute_stats(&self, recent_users_limit: usize) -> Result<AdminStats> {
        self.database.with_repositories(|repos| {
            let totals = repos.stats().totals()?;
            let recent_users = repos
                .profiles()
                .list_recent(recent_users_limit)?
                .into_iter()
                .map(ProfileSummary::from_record)
                .collect();
            Ok(AdminStats {
                avg_posts_per_user: ratio(totals.total_posts, totals.total_users),
                avg_comments_per_post: ratio(totals.total_comments, totals.total_posts),
                avg_follows_per_user: ratio(totals.total_follows, totals.total_users),
                totals,
                recent_users,
            })
        })
    }
}

fn ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    pub totals: StatsRecord,
    pub avg_posts_per_user: f64,
    pub avg_comments_per_post: f64,
    pub avg_follows_per_user: f64,
    pub recent_users: Vec<ProfileSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CommentRecord, FollowRecord, LikeRecord, PostRecord, ProfileRecord};
    use crate::database::repositories::{
        CommentRepository, FollowRepository, LikeRepository, PostRepository,
    };
    use rusqlite::Connection;
    use uuid::Uuid;

    fn setup() -> (AdminService, Database) {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");
        (AdminService::new(db.clone()), db)
    }

    fn seed_profile(db: &Database, id: &str, created_at: &str) {
        db.with_repositories(|repos| {
            repos.profiles().create(&ProfileRecord {
                id: id.into(),
                username: id.into(),
                display_name: None,
                bio: None,
                avatar_url: None,
                email: None,
                role: crate::auth::ROLE_MEMBER.into(),
                created_at: created_at.into(),
                updated_at: None,
            })
        })
        .expect("seed profile");
    }

    #[test]
    fn stats_are_zero_on_an_empty_database() {
        let (service, _db) = setup();
        let stats = service.compute_stats(10).expect("stats");
        assert_eq!(stats.totals.total_users, 0);
        assert_eq!(stats.avg_posts_per_user, 0.0);
        assert_eq!(stats.avg_comments_per_post, 0.0);
        assert_eq!(stats.avg_follows_per_user, 0.0);
        assert!(stats.recent_users.is_empty());
    }

    #[test]
    fn stats_report_totals_ratios_and_recent_users() {
        let (service, db) = setup();
        seed_profile(&db, "alice", "2024-01-01T00:00:00Z");
        seed_profile(&db, "bob", "2024-01-02T00:00:00Z");
        db.with_repositories(|repos| {
            let post_id = Uuid::new_v4().to_string();
            repos.posts().create(&PostRecord {
                id: post_id.clone(),
                user_id: "alice".into(),
                content: "hi".into(),
                image_url: None,
                created_at: "2024-01-03T00:00:00Z".into(),
            })?;
            repos.comments().create(&CommentRecord {
                id: Uuid::new_v4().to_string(),
                post_id: post_id.clone(),
                user_id: "bob".into(),
                content: "hello".into(),
                created_at: "2024-01-03T01:00:00Z".into(),
            })?;
            repos.likes().add(&LikeRecord {
                post_id,
                user_id: "bob".into(),
                created_at: "2024-01-03T02:00:00Z".into(),
            })?;
            repos.follows().add(&FollowRecord {
                follower_id: "bob".into(),
                following_id: "alice".into(),
                created_at: "2024-01-03T03:00:00Z".into(),
            })?;
            Ok(())
        })
        .expect("seed");

        let stats = service.compute_stats(1).expect("stats");
        assert_eq!(stats.totals.total_users, 2);
        assert_eq!(stats.totals.total_posts, 1);
        assert_eq!(stats.totals.total_comments, 1);
        assert_eq!(stats.totals.total_follows, 1);
        assert_eq!(stats.avg_posts_per_user, 0.5);
        assert_eq!(stats.avg_comments_per_post, 1.0);
        assert_eq!(stats.avg_follows_per_user, 0.5);
        // Newest signup first, capped at the requested limit.
        assert_eq!(stats.recent_users.len(), 1);
        assert_eq!(stats.recent_users[0].username, "bob");
    }
}
