use crate::database::models::{PostRecord, ProfileRecord};
use anyhow::Result;
use rusqlite::{params, Connection};

pub(super) struct SqliteSearchRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

/// SQLite's LIKE is already case-insensitive for ASCII; the caller-supplied
/// text only needs its wildcard characters neutralized.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl<'conn> super::SearchRepository for SqliteSearchRepository<'conn> {
    fn search_posts(&self, query: &str, limit: usize) -> Result<Vec<PostRecord>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, content, image_url, created_at
            FROM posts
            WHERE content LIKE ?1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;
        let rows = stmt.query_map(params![like_pattern(query), limit as i64], |row| {
            Ok(PostRecord {
                id: row.get(0)?,
                user_id: row.get(1)?,
                content: row.get(2)?,
                image_url: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }

    fn search_profiles(&self, query: &str, limit: usize) -> Result<Vec<ProfileRecord>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, username, display_name, bio, avatar_url, email, role, created_at, updated_at
            FROM profiles
            WHERE username LIKE ?1 ESCAPE '\' OR display_name LIKE ?1 ESCAPE '\'
            ORDER BY username ASC
            LIMIT ?2
            "#,
        )?;
        let rows = stmt.query_map(params![like_pattern(query), limit as i64], |row| {
            Ok(ProfileRecord {
                id: row.get(0)?,
                username: row.get(1)?,
                display_name: row.get(2)?,
                bio: row.get(3)?,
                avatar_url: row.get(4)?,
                email: row.get(5)?,
                role: row.get(6)?,
                created_at: row.get(7)?,
                updated_at: row.get(8)?,
            })
        })?;
        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?);
        }
        Ok(profiles)
    }
}
