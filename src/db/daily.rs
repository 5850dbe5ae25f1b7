//! Daily learning entries

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};

use super::{format_timestamp, timestamp_column};
use crate::domain::DailyEntry;

pub fn insert_daily_entry(
    conn: &Connection,
    user_id: i64,
    topic: &str,
    now: DateTime<Utc>,
) -> Result<DailyEntry> {
    conn.execute(
        "INSERT INTO daily_entries (user_id, topic, created_at) VALUES (?1, ?2, ?3)",
        params![user_id, topic, format_timestamp(&now)],
    )?;
    Ok(DailyEntry {
        id: conn.last_insert_rowid(),
        user_id,
        topic: topic.to_string(),
        created_at: now,
    })
}

/// Most recent entries first
pub fn list_daily_entries(conn: &Connection, user_id: i64, limit: usize) -> Result<Vec<DailyEntry>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, topic, created_at
    FROM daily_entries WHERE user_id = ?1
    ORDER BY created_at DESC, id DESC
    LIMIT ?2
    "#,
    )?;
    let entries = stmt
        .query_map(params![user_id, limit as i64], |row| {
            Ok(DailyEntry {
                id: row.get(0)?,
                user_id: row.get(1)?,
                topic: row.get(2)?,
                created_at: timestamp_column(row, 3)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(entries)
}
