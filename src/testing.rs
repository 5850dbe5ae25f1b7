//! Test utilities for database setup.
//!
//! Reuses the production initialization path so tests never carry a copy
//! of the schema.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::sync::MutexGuard;
use tempfile::TempDir;

use crate::db::{self, DbPool};
use crate::domain::Flashcard;
use crate::validation::{FlashcardInput, SubjectInput};

/// A migrated database file in a temporary directory, removed on drop
pub struct TestEnv {
    /// Kept alive for database file persistence
    pub temp: TempDir,
    pub pool: DbPool,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let pool = db::init_db(&temp.path().join("study.db"))?;
        Ok(Self { temp, pool })
    }

    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        db::try_lock(&self.pool).expect("test database lock")
    }

    /// Insert a user with a placeholder password hash
    pub fn seed_user(&self, conn: &Connection, email: &str) -> i64 {
        crate::auth::db::create_user(conn, email, "Test User", "not-a-real-hash", Utc::now())
            .expect("seed user")
    }

    pub fn seed_subject(&self, conn: &Connection, user_id: i64, name: &str) -> i64 {
        let subject = SubjectInput {
            name: name.to_string(),
            description: None,
            difficulty: None,
        }
        .validate()
        .expect("valid subject");
        db::insert_subject(conn, user_id, &subject, Utc::now()).expect("seed subject")
    }

    /// Insert a card whose first review falls due at `due_at`
    pub fn seed_flashcard(
        &self,
        conn: &Connection,
        user_id: i64,
        subject_id: i64,
        question: &str,
        due_at: DateTime<Utc>,
    ) -> Flashcard {
        let card = FlashcardInput {
            subject_id,
            question: question.to_string(),
            answer: "answer".to_string(),
            difficulty: None,
        }
        .validate()
        .expect("valid flashcard");
        db::insert_flashcard(conn, user_id, &card, due_at).expect("seed flashcard")
    }
}
