use crate::database::models::ProfileRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

pub(super) struct SqliteProfileRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

const PROFILE_COLUMNS: &str =
    "id, username, display_name, bio, avatar_url, email, role, created_at, updated_at";

fn map_profile(row: &Row<'_>) -> rusqlite::Result<ProfileRecord> {
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
}

impl<'conn> super::ProfileRepository for SqliteProfileRepository<'conn> {
    fn create(&self, record: &ProfileRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO profiles (id, username, display_name, bio, avatar_url, email, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.id,
                record.username,
                record.display_name,
                record.bio,
                record.avatar_url,
                record.email,
                record.role,
                record.created_at,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<ProfileRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
                params![id],
                map_profile,
            )
            .optional()?)
    }

    fn get_by_username(&self, username: &str) -> Result<Option<ProfileRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE username = ?1"),
                params![username],
                map_profile,
            )
            .optional()?)
    }

    fn get_many(&self, ids: &[String]) -> Result<HashMap<String, ProfileRecord>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql =
            format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id IN ({placeholders})");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), map_profile)?;
        let mut profiles = HashMap::new();
        for row in rows {
            let record = row?;
            profiles.insert(record.id.clone(), record);
        }
        Ok(profiles)
    }

    fn update_details(
        &self,
        id: &str,
        display_name: Option<&str>,
        bio: Option<&str>,
        avatar_url: Option<&str>,
        updated_at: &str,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            r#"
            UPDATE profiles
            SET display_name = ?2, bio = ?3, avatar_url = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
            params![id, display_name, bio, avatar_url, updated_at],
        )?;
        Ok(changed > 0)
    }

    fn set_role(&self, id: &str, role: &str) -> Result<bool> {
        let changed = self
            .conn
            .execute("UPDATE profiles SET role = ?2 WHERE id = ?1", params![id, role])?;
        Ok(changed > 0)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<ProfileRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM profiles
            ORDER BY datetime(created_at) DESC, id DESC
            LIMIT ?1
            "#
        ))?;
        let rows = stmt.query_map(params![limit as i64], map_profile)?;
        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?);
        }
        Ok(profiles)
    }
}
