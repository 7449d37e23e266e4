use crate::database::models::{
    NotificationRecord, NOTIFICATION_COMMENT, NOTIFICATION_FOLLOW, NOTIFICATION_LIKE,
};
use crate::database::repositories::{NotificationRepository, ProfileRepository};
use crate::database::Database;
use crate::profiles::ProfileSummary;
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NOTIFICATION_LIMIT: usize = 50;

#[derive(Clone)]
pub struct NotificationService {
    database: Database,
}

impl NotificationService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Returns the viewer's recent notifications and marks the unread ones as
    /// read. The returned views still show the read state the viewer saw
    /// before opening the list.
    pub fn list_and_mark_read(
        &self,
        viewer_id: &str,
        limit: usize,
    ) -> Result<Vec<NotificationView>> {
        self.database.with_repositories(|repos| {
            let notifications = repos.notifications();
            let records = notifications.list_for_user(viewer_id, limit)?;
            if records.iter().any(|record| !record.read) {
                notifications.mark_all_read(viewer_id)?;
            }

            let actor_ids: Vec<String> = records.iter().map(|r| r.actor_id.clone()).collect();
            let actors = repos.profiles().get_many(&actor_ids)?;
            Ok(records
                .into_iter()
                .map(|record| {
                    let actor = actors
                        .get(&record.actor_id)
                        .cloned()
                        .map(ProfileSummary::from_record);
                    NotificationView::build(record, actor)
                })
                .collect())
        })
    }

    pub fn unread_count(&self, viewer_id: &str) -> Result<i64> {
        self.database
            .with_repositories(|repos| repos.notifications().count_unread(viewer_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub actor: Option<ProfileSummary>,
    pub post_id: Option<String>,
    pub comment_id: Option<String>,
    pub read: bool,
    pub created_at: String,
    pub message: String,
}

impl NotificationView {
    fn build(record: NotificationRecord, actor: Option<ProfileSummary>) -> Self {
        let actor_label = actor
            .as_ref()
            .map(|a| a.display_label().to_string())
            .unwrap_or_else(|| "Someone".to_string());
        let message = match record.kind.as_str() {
            NOTIFICATION_LIKE => format!("{actor_label} liked your post"),
            NOTIFICATION_COMMENT => format!("{actor_label} commented on your post"),
            NOTIFICATION_FOLLOW => format!("{actor_label} started following you"),
            other => format!("{actor_label} sent you a {other} notification"),
        };
        Self {
            id: record.id,
            kind: record.kind,
            actor,
            post_id: record.post_id,
            comment_id: record.comment_id,
            read: record.read,
            created_at: record.created_at,
            message,
        }
    }
}
