use crate::database::models::NotificationRecord;
use anyhow::Result;
use rusqlite::{params, Connection, Row};

pub(super) struct SqliteNotificationRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn map_notification(row: &Row<'_>) -> rusqlite::Result<NotificationRecord> {
    Ok(NotificationRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: row.get(2)?,
        actor_id: row.get(3)?,
        post_id: row.get(4)?,
        comment_id: row.get(5)?,
        read: row.get::<_, i64>(6)? != 0,
        created_at: row.get(7)?,
    })
}

impl<'conn> super::NotificationRepository for SqliteNotificationRepository<'conn> {
    fn create(&self, record: &NotificationRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO notifications (id, user_id, type, actor_id, post_id, comment_id, read, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.id,
                record.user_id,
                record.kind,
                record.actor_id,
                record.post_id,
                record.comment_id,
                record.read as i64,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn list_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<NotificationRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, type, actor_id, post_id, comment_id, read, created_at
            FROM notifications
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;
        let rows = stmt.query_map(params![user_id, limit as i64], map_notification)?;
        let mut notifications = Vec::new();
        for row in rows {
            notifications.push(row?);
        }
        Ok(notifications)
    }

    fn mark_all_read(&self, user_id: &str) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE notifications SET read = 1 WHERE user_id = ?1 AND read = 0",
            params![user_id],
        )?)
    }

    fn count_unread(&self, user_id: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND read = 0",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    fn delete_for_post(&self, post_id: &str) -> Result<usize> {
        Ok(self.conn.execute(
            "DELETE FROM notifications WHERE post_id = ?1",
            params![post_id],
        )?)
    }
}
