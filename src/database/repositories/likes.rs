use crate::database::models::LikeRecord;
use anyhow::Result;
use rusqlite::{params, Connection, ToSql};
use std::collections::{HashMap, HashSet};

pub(super) struct SqliteLikeRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::LikeRepository for SqliteLikeRepository<'conn> {
    fn add(&self, record: &LikeRecord) -> Result<bool> {
        let inserted = self.conn.execute(
            r#"
            INSERT OR IGNORE INTO likes (post_id, user_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![record.post_id, record.user_id, record.created_at],
        )?;
        Ok(inserted > 0)
    }

    fn remove(&self, post_id: &str, user_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
        )?;
        Ok(removed > 0)
    }

    fn count_for_post(&self, post_id: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?)
    }

    fn count_for_posts(&self, post_ids: &[String]) -> Result<HashMap<String, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; post_ids.len()].join(", ");
        let sql = format!(
            "SELECT post_id, COUNT(*) FROM likes WHERE post_id IN ({placeholders}) GROUP BY post_id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(post_ids.iter()), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut counts = HashMap::new();
        for row in rows {
            let (post_id, count) = row?;
            counts.insert(post_id, count);
        }
        Ok(counts)
    }

    fn liked_by_user(&self, post_ids: &[String], user_id: &str) -> Result<HashSet<String>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let placeholders = vec!["?"; post_ids.len()].join(", ");
        let sql = format!(
            "SELECT post_id FROM likes WHERE user_id = ? AND post_id IN ({placeholders})"
        );
        let mut bind: Vec<&dyn ToSql> = Vec::with_capacity(post_ids.len() + 1);
        bind.push(&user_id);
        for id in post_ids {
            bind.push(id);
        }
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(bind.as_slice(), |row| row.get::<_, String>(0))?;
        let mut liked = HashSet::new();
        for row in rows {
            liked.insert(row?);
        }
        Ok(liked)
    }
}
