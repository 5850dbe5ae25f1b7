//! Accounts and bearer sessions

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::Serialize;

use crate::db::{format_timestamp, optional_timestamp_column, timestamp_column};
use crate::domain::Preferences;

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub preferences: Preferences,
}

fn row_to_user(row: &rusqlite::Row) -> Result<UserInfo> {
    Ok(UserInfo {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
        last_login_at: optional_timestamp_column(row, 4)?,
        preferences: Preferences {
            reminder_time: row.get(5)?,
            study_goal: row.get(6)?,
        },
    })
}

/// Create a new user, returns the user ID
pub fn create_user(
    conn: &Connection,
    email: &str,
    name: &str,
    password_hash: &str,
    now: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (email, name, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![email, name, password_hash, format_timestamp(&now)],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Check if an email is already registered (case-insensitive)
pub fn email_exists(conn: &Connection, email: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        params![email],
        |row| row.get(0),
    )
}

/// Get user by email, returns (user_id, password_hash)
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<(i64, String)>> {
    conn.query_row(
        "SELECT id, password_hash FROM users WHERE email = ?1",
        params![email],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn get_user_by_id(conn: &Connection, user_id: i64) -> Result<Option<UserInfo>> {
    conn.query_row(
        "SELECT id, email, name, created_at, last_login_at, reminder_time, study_goal FROM users WHERE id = ?1",
        params![user_id],
        row_to_user,
    )
    .optional()
}

/// Update user's last login timestamp
pub fn update_last_login(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
        params![format_timestamp(&now), user_id],
    )?;
    Ok(())
}

/// Replace a user's study preferences
pub fn update_preferences(conn: &Connection, user_id: i64, prefs: &Preferences) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE users SET reminder_time = ?1, study_goal = ?2 WHERE id = ?3",
        params![prefs.reminder_time, prefs.study_goal, user_id],
    )?;
    Ok(updated > 0)
}

/// Store a new session under the hash of its token
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    token_hash: &str,
    duration_hours: i64,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    let expires = Duration::try_hours(duration_hours)
        .and_then(|d| now.checked_add_signed(d))
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, duration_hours))?;
    conn.execute(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?3)",
        params![
            token_hash,
            user_id,
            format_timestamp(&now),
            format_timestamp(&expires),
        ],
    )?;
    Ok(expires)
}

/// Resolve an unexpired session to its user, touching its last access time
pub fn get_session_user(
    conn: &Connection,
    token_hash: &str,
    now: DateTime<Utc>,
) -> Result<Option<UserInfo>> {
    let now = format_timestamp(&now);
    let user = conn
        .query_row(
            r#"
        SELECT u.id, u.email, u.name, u.created_at, u.last_login_at, u.reminder_time, u.study_goal
        FROM sessions s
        JOIN users u ON s.user_id = u.id
        WHERE s.token_hash = ?1 AND s.expires_at > ?2
    "#,
            params![token_hash, now],
            row_to_user,
        )
        .optional()?;

    if user.is_some() {
        conn.execute(
            "UPDATE sessions SET last_access_at = ?1 WHERE token_hash = ?2",
            params![now, token_hash],
        )?;
    }
    Ok(user)
}

/// Delete a session (logout)
pub fn delete_session(conn: &Connection, token_hash: &str) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM sessions WHERE token_hash = ?1",
        params![token_hash],
    )?;
    Ok(deleted > 0)
}

/// Cleanup expired sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection, now: DateTime<Utc>) -> Result<usize> {
    conn.execute(
        "DELETE FROM sessions WHERE expires_at <= ?1",
        params![format_timestamp(&now)],
    )
}
