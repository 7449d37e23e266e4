use crate::database::models::PostRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

pub(super) struct SqlitePostRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

const POST_COLUMNS: &str = "id, user_id, content, image_url, created_at";

fn map_post(row: &Row<'_>) -> rusqlite::Result<PostRecord> {
    Ok(PostRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        content: row.get(2)?,
        image_url: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl<'conn> super::PostRepository for SqlitePostRepository<'conn> {
    fn create(&self, record: &PostRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO posts (id, user_id, content, image_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.id,
                record.user_id,
                record.content,
                record.image_url,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<PostRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                params![id],
                map_post,
            )
            .optional()?)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn list_for_authors(
        &self,
        author_ids: &[String],
        before: Option<(&str, &str)>,
        limit: usize,
    ) -> Result<Vec<PostRecord>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; author_ids.len()].join(", ");
        let mut sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE user_id IN ({placeholders})"
        );
        let mut bind: Vec<&dyn ToSql> = author_ids.iter().map(|id| id as &dyn ToSql).collect();
        if let Some((created_at, id)) = &before {
            sql.push_str(" AND (created_at < ? OR (created_at = ? AND id < ?))");
            bind.push(created_at);
            bind.push(created_at);
            bind.push(id);
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");
        let limit = limit as i64;
        bind.push(&limit);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(bind.as_slice(), map_post)?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }

    fn list_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<PostRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#
        ))?;
        let rows = stmt.query_map(params![user_id, limit as i64], map_post)?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }

    fn count_for_user(&self, user_id: &str) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }
}
