//! Subjects and their topic notes

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{difficulty_column, format_timestamp, timestamp_column, StorageError};
use crate::domain::{Subject, Topic};
use crate::validation::{NewSubject, NewTopic};

pub fn insert_subject(
    conn: &Connection,
    user_id: i64,
    subject: &NewSubject,
    now: DateTime<Utc>,
) -> Result<i64> {
    let now = format_timestamp(&now);
    conn.execute(
        r#"
    INSERT INTO subjects (user_id, name, description, difficulty, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?5)
    "#,
        params![
            user_id,
            subject.name,
            subject.description,
            subject.difficulty.as_str(),
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Subject with its topics, if it exists and belongs to `user_id`
pub fn get_subject(conn: &Connection, user_id: i64, id: i64) -> Result<Option<Subject>> {
    let subject = conn
        .query_row(
            r#"
      SELECT id, user_id, name, description, difficulty, created_at, updated_at
      FROM subjects WHERE id = ?1 AND user_id = ?2
      "#,
            params![id, user_id],
            row_to_subject,
        )
        .optional()?;

    match subject {
        Some(mut subject) => {
            subject.topics = list_topics(conn, subject.id)?;
            Ok(Some(subject))
        }
        None => Ok(None),
    }
}

/// All subjects of a user, newest first (topics not loaded)
pub fn list_subjects(conn: &Connection, user_id: i64) -> Result<Vec<Subject>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, name, description, difficulty, created_at, updated_at
    FROM subjects WHERE user_id = ?1
    ORDER BY created_at DESC, id DESC
    "#,
    )?;
    let subjects = stmt
        .query_map(params![user_id], row_to_subject)?
        .collect::<Result<Vec<_>>>()?;
    Ok(subjects)
}

pub fn subject_exists(conn: &Connection, user_id: i64, id: i64) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM subjects WHERE id = ?1 AND user_id = ?2)",
        params![id, user_id],
        |row| row.get(0),
    )
}

/// Returns false when no subject of this user matched
pub fn update_subject(
    conn: &Connection,
    user_id: i64,
    id: i64,
    subject: &NewSubject,
    now: DateTime<Utc>,
) -> Result<bool> {
    let updated = conn.execute(
        r#"
    UPDATE subjects
    SET name = ?1, description = ?2, difficulty = ?3, updated_at = ?4
    WHERE id = ?5 AND user_id = ?6
    "#,
        params![
            subject.name,
            subject.description,
            subject.difficulty.as_str(),
            format_timestamp(&now),
            id,
            user_id,
        ],
    )?;
    Ok(updated > 0)
}

/// Deletes the subject together with its topics and flashcards
pub fn delete_subject(conn: &Connection, user_id: i64, id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM subjects WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(deleted > 0)
}

pub fn count_subjects(conn: &Connection, user_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM subjects WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

pub fn insert_topic(
    conn: &Connection,
    user_id: i64,
    subject_id: i64,
    topic: &NewTopic,
    now: DateTime<Utc>,
) -> std::result::Result<Topic, StorageError> {
    if !subject_exists(conn, user_id, subject_id)? {
        return Err(StorageError::NotFound);
    }

    conn.execute(
        r#"
    INSERT INTO topics (subject_id, title, content, difficulty, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
        params![
            subject_id,
            topic.title,
            topic.content,
            topic.difficulty.as_str(),
            format_timestamp(&now),
        ],
    )?;
    let id = conn.last_insert_rowid();
    conn.execute(
        "UPDATE subjects SET updated_at = ?1 WHERE id = ?2",
        params![format_timestamp(&now), subject_id],
    )?;

    Ok(Topic {
        id,
        subject_id,
        title: topic.title.clone(),
        content: topic.content.clone(),
        difficulty: topic.difficulty,
        created_at: now,
    })
}

pub fn list_topics(conn: &Connection, subject_id: i64) -> Result<Vec<Topic>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, subject_id, title, content, difficulty, created_at
    FROM topics WHERE subject_id = ?1
    ORDER BY created_at ASC, id ASC
    "#,
    )?;
    let topics = stmt
        .query_map(params![subject_id], |row| {
            Ok(Topic {
                id: row.get(0)?,
                subject_id: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
                difficulty: difficulty_column(row, 4)?,
                created_at: timestamp_column(row, 5)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(topics)
}

fn row_to_subject(row: &rusqlite::Row) -> Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        difficulty: difficulty_column(row, 4)?,
        created_at: timestamp_column(row, 5)?,
        updated_at: timestamp_column(row, 6)?,
        topics: Vec::new(),
    })
}
