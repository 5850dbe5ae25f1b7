//! Flashcards and their embedded SM-2 schedule

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::{
    difficulty_column, format_timestamp, optional_timestamp_column, parse_timestamp,
    timestamp_column, StorageError,
};
use crate::domain::{Flashcard, FlashcardId, FlashcardSchedule, ReviewLog};
use crate::validation::NewFlashcard;

const FLASHCARD_COLUMNS: &str = "id, user_id, subject_id, question, answer, difficulty, is_generated, \
     created_at, interval_days, easiness_factor, repetitions, next_review, last_reviewed_at, \
     schedule_version";

/// A schedule as read from storage, with the version needed to write it back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredSchedule {
    pub schedule: FlashcardSchedule,
    pub version: i64,
}

/// Storage operations the review flow depends on
pub trait ScheduleStore {
    fn load_schedule(
        &self,
        user_id: i64,
        flashcard_id: FlashcardId,
    ) -> std::result::Result<StoredSchedule, StorageError>;

    /// Write `schedule` only if the stored version is still `expected_version`.
    /// Returns the new version.
    fn save_schedule(
        &self,
        user_id: i64,
        flashcard_id: FlashcardId,
        expected_version: i64,
        schedule: &FlashcardSchedule,
    ) -> std::result::Result<i64, StorageError>;

    fn record_review(&self, log: &ReviewLog) -> std::result::Result<i64, StorageError>;
}

impl ScheduleStore for Connection {
    fn load_schedule(
        &self,
        user_id: i64,
        flashcard_id: FlashcardId,
    ) -> std::result::Result<StoredSchedule, StorageError> {
        load_schedule(self, user_id, flashcard_id)
    }

    fn save_schedule(
        &self,
        user_id: i64,
        flashcard_id: FlashcardId,
        expected_version: i64,
        schedule: &FlashcardSchedule,
    ) -> std::result::Result<i64, StorageError> {
        save_schedule(self, user_id, flashcard_id, expected_version, schedule)
    }

    fn record_review(&self, log: &ReviewLog) -> std::result::Result<i64, StorageError> {
        Ok(super::insert_review_log(self, log)?)
    }
}

/// Create a card with the default schedule under a subject the user owns
pub fn insert_flashcard(
    conn: &Connection,
    user_id: i64,
    card: &NewFlashcard,
    now: DateTime<Utc>,
) -> std::result::Result<Flashcard, StorageError> {
    if !super::subject_exists(conn, user_id, card.subject_id)? {
        return Err(StorageError::NotFound);
    }

    let mut flashcard = Flashcard::new(
        user_id,
        card.subject_id,
        card.question.clone(),
        card.answer.clone(),
        card.difficulty,
        now,
    );
    flashcard.schedule.validate()?;

    conn.execute(
        r#"
    INSERT INTO flashcards (user_id, subject_id, question, answer, difficulty, is_generated,
                            created_at, interval_days, easiness_factor, repetitions, next_review,
                            last_reviewed_at, schedule_version)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
    "#,
        params![
            flashcard.user_id,
            flashcard.subject_id,
            flashcard.question,
            flashcard.answer,
            flashcard.difficulty.as_str(),
            flashcard.is_generated,
            format_timestamp(&flashcard.created_at),
            flashcard.schedule.interval,
            flashcard.schedule.easiness_factor,
            flashcard.schedule.repetitions,
            format_timestamp(&flashcard.schedule.next_review),
            flashcard.schedule.last_reviewed_at.as_ref().map(format_timestamp),
            flashcard.schedule_version,
        ],
    )?;
    flashcard.id = conn.last_insert_rowid();
    Ok(flashcard)
}

pub fn get_flashcard(conn: &Connection, user_id: i64, id: FlashcardId) -> Result<Option<Flashcard>> {
    conn.query_row(
        &format!("SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE id = ?1 AND user_id = ?2"),
        params![id, user_id],
        row_to_flashcard,
    )
    .optional()
}

/// A user's cards, optionally within one subject, soonest review first
pub fn list_flashcards(
    conn: &Connection,
    user_id: i64,
    subject_id: Option<i64>,
) -> Result<Vec<Flashcard>> {
    let mut stmt = conn.prepare(&format!(
        r#"
    SELECT {FLASHCARD_COLUMNS}
    FROM flashcards
    WHERE user_id = ?1 AND (?2 IS NULL OR subject_id = ?2)
    ORDER BY next_review ASC, id ASC
    "#
    ))?;
    let cards = stmt
        .query_map(params![user_id, subject_id], row_to_flashcard)?
        .collect::<Result<Vec<_>>>()?;
    Ok(cards)
}

pub fn delete_flashcard(conn: &Connection, user_id: i64, id: FlashcardId) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM flashcards WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(deleted > 0)
}

pub fn count_flashcards(conn: &Connection, user_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM flashcards WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

pub fn get_due_count(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM flashcards WHERE user_id = ?1 AND next_review <= ?2",
        params![user_id, format_timestamp(&now)],
        |row| row.get(0),
    )
}

/// Get the next scheduled review time (for cards not yet due)
pub fn get_next_review_time(
    conn: &Connection,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    let next: Option<String> = conn.query_row(
        "SELECT MIN(next_review) FROM flashcards WHERE user_id = ?1 AND next_review > ?2",
        params![user_id, format_timestamp(&now)],
        |row| row.get(0),
    )?;
    Ok(next.and_then(|s| parse_timestamp(&s).ok()))
}

pub fn load_schedule(
    conn: &Connection,
    user_id: i64,
    flashcard_id: FlashcardId,
) -> std::result::Result<StoredSchedule, StorageError> {
    conn.query_row(
        r#"
    SELECT interval_days, easiness_factor, repetitions, next_review, last_reviewed_at, schedule_version
    FROM flashcards WHERE id = ?1 AND user_id = ?2
    "#,
        params![flashcard_id, user_id],
        |row| {
            Ok(StoredSchedule {
                schedule: FlashcardSchedule {
                    interval: row.get(0)?,
                    easiness_factor: row.get(1)?,
                    repetitions: row.get(2)?,
                    next_review: timestamp_column(row, 3)?,
                    last_reviewed_at: optional_timestamp_column(row, 4)?,
                },
                version: row.get(5)?,
            })
        },
    )
    .optional()?
    .ok_or(StorageError::NotFound)
}

pub fn save_schedule(
    conn: &Connection,
    user_id: i64,
    flashcard_id: FlashcardId,
    expected_version: i64,
    schedule: &FlashcardSchedule,
) -> std::result::Result<i64, StorageError> {
    schedule.validate()?;

    let updated = conn.execute(
        r#"
    UPDATE flashcards
    SET interval_days = ?1, easiness_factor = ?2, repetitions = ?3, next_review = ?4,
        last_reviewed_at = ?5, schedule_version = schedule_version + 1
    WHERE id = ?6 AND user_id = ?7 AND schedule_version = ?8
    "#,
        params![
            schedule.interval,
            schedule.easiness_factor,
            schedule.repetitions,
            format_timestamp(&schedule.next_review),
            schedule.last_reviewed_at.as_ref().map(format_timestamp),
            flashcard_id,
            user_id,
            expected_version,
        ],
    )?;

    if updated > 0 {
        return Ok(expected_version + 1);
    }

    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM flashcards WHERE id = ?1 AND user_id = ?2)",
        params![flashcard_id, user_id],
        |row| row.get(0),
    )?;
    if exists {
        Err(StorageError::Conflict)
    } else {
        Err(StorageError::NotFound)
    }
}

fn row_to_flashcard(row: &rusqlite::Row) -> Result<Flashcard> {
    Ok(Flashcard {
        id: row.get(0)?,
        user_id: row.get(1)?,
        subject_id: row.get(2)?,
        question: row.get(3)?,
        answer: row.get(4)?,
        difficulty: difficulty_column(row, 5)?,
        is_generated: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
        schedule: FlashcardSchedule {
            interval: row.get(8)?,
            easiness_factor: row.get(9)?,
            repetitions: row.get(10)?,
            next_review: timestamp_column(row, 11)?,
            last_reviewed_at: optional_timestamp_column(row, 12)?,
        },
        schedule_version: row.get(13)?,
    })
}
