use crate::database::models::FollowRecord;
use anyhow::Result;
use rusqlite::{params, Connection};

pub(super) struct SqliteFollowRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::FollowRepository for SqliteFollowRepository<'conn> {
    fn add(&self, record: &FollowRecord) -> Result<bool> {
        let inserted = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO follows (follower_id, following_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![record.follower_id, record.following_id, record.created_at],
        )?;
        Ok(inserted > 0)
    }

    fn remove(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
            params![follower_id, following_id],
        )?;
        Ok(removed > 0)
    }

    fn is_following(&self, follower_id: &str, following_id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1 AND following_id = ?2",
            params![follower_id, following_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn following_ids(&self, follower_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT following_id FROM follows WHERE follower_id = ?1 ORDER BY following_id ASC",
        )?;
        let rows = stmt.query_map(params![follower_id], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    fn follower_count(&self, user_id: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE following_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    fn following_count(&self, user_id: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }
}
