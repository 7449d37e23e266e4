use crate::database::models::StatsRecord;
use anyhow::Result;
use rusqlite::Connection;

pub(super) struct SqliteStatsRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> SqliteStatsRepository<'conn> {
    fn count_table(&self, table: &str) -> Result<i64> {
        Ok(self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?)
    }
}

impl<'conn> super::StatsRepository for SqliteStatsRepository<'conn> {
    fn totals(&self) -> Result<StatsRecord> {
        Ok(StatsRecord {
            total_users: self.count_table("profiles")?,
            total_posts: self.count_table("posts")?,
            total_comments: self.count_table("comments")?,
            total_follows: self.count_table("follows")?,
        })
    }
}
