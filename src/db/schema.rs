//! Learning database schema.
//!
//! Version-gated: each migration checks the recorded version, runs inside a
//! transaction and records its own version, so it runs exactly once.

use chrono::Utc;
use rusqlite::{params, Connection, Result};

/// Current schema version. Increment when adding a migration.
pub const SCHEMA_VERSION: i32 = 2;

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS db_version (
      version INTEGER PRIMARY KEY,
      applied_at TEXT NOT NULL,
      description TEXT
    );
    "#,
  )?;

  let current_version = get_schema_version(conn)?;
  tracing::debug!("schema version: {}", current_version);

  if current_version < 1 {
    migrate_v0_to_v1(conn)?;
  }
  if current_version < 2 {
    migrate_v1_to_v2(conn)?;
  }

  Ok(())
}

/// v0→v1: accounts, subjects, topics, flashcards with embedded SM-2 state, review log
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
  tracing::info!("Running migration v0→v1: Create base tables");

  let tx = conn.unchecked_transaction()?;
  tx.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS users (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      email TEXT NOT NULL UNIQUE COLLATE NOCASE,
      name TEXT NOT NULL,
      password_hash TEXT NOT NULL,
      created_at TEXT NOT NULL,
      last_login_at TEXT
    );

    CREATE TABLE IF NOT EXISTS sessions (
      token_hash TEXT PRIMARY KEY,
      user_id INTEGER NOT NULL,
      created_at TEXT NOT NULL,
      expires_at TEXT NOT NULL,
      last_access_at TEXT NOT NULL,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS subjects (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      name TEXT NOT NULL,
      description TEXT,
      difficulty TEXT NOT NULL DEFAULT 'Medium',
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS topics (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      subject_id INTEGER NOT NULL,
      title TEXT NOT NULL,
      content TEXT NOT NULL DEFAULT '',
      difficulty TEXT NOT NULL DEFAULT 'Medium',
      created_at TEXT NOT NULL,
      FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS flashcards (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      subject_id INTEGER NOT NULL,
      question TEXT NOT NULL,
      answer TEXT NOT NULL,
      difficulty TEXT NOT NULL DEFAULT 'Medium',
      is_generated INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL,
      -- SM-2 schedule
      interval_days INTEGER NOT NULL DEFAULT 1 CHECK (interval_days >= 1),
      easiness_factor REAL NOT NULL DEFAULT 2.5 CHECK (easiness_factor >= 1.3),
      repetitions INTEGER NOT NULL DEFAULT 0 CHECK (repetitions >= 0),
      next_review TEXT NOT NULL,
      last_reviewed_at TEXT,
      schedule_version INTEGER NOT NULL DEFAULT 0,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
      FOREIGN KEY (subject_id) REFERENCES subjects(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS review_logs (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      flashcard_id INTEGER NOT NULL,
      user_id INTEGER NOT NULL,
      quality INTEGER NOT NULL,
      reviewed_at TEXT NOT NULL,
      interval_before INTEGER NOT NULL,
      interval_after INTEGER NOT NULL,
      FOREIGN KEY (flashcard_id) REFERENCES flashcards(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
    CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
    CREATE INDEX IF NOT EXISTS idx_subjects_user_id ON subjects(user_id);
    CREATE INDEX IF NOT EXISTS idx_topics_subject_id ON topics(subject_id);
    CREATE INDEX IF NOT EXISTS idx_flashcards_user_next_review ON flashcards(user_id, next_review);
    CREATE INDEX IF NOT EXISTS idx_flashcards_subject_id ON flashcards(subject_id);
    CREATE INDEX IF NOT EXISTS idx_review_logs_user_reviewed_at ON review_logs(user_id, reviewed_at);
    CREATE INDEX IF NOT EXISTS idx_review_logs_flashcard_id ON review_logs(flashcard_id);
    "#,
  )?;
  record_version(&tx, 1, "Create base tables")?;
  tx.commit()
}

/// v1→v2: study preferences on users, daily learning entries
fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
  tracing::info!("Running migration v1→v2: Preferences and daily entries");

  let tx = conn.unchecked_transaction()?;
  tx.execute_batch(
    r#"
    ALTER TABLE users ADD COLUMN reminder_time TEXT NOT NULL DEFAULT '09:00';
    ALTER TABLE users ADD COLUMN study_goal INTEGER NOT NULL DEFAULT 30;

    CREATE TABLE IF NOT EXISTS daily_entries (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      topic TEXT NOT NULL,
      created_at TEXT NOT NULL,
      FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_daily_entries_user_created_at ON daily_entries(user_id, created_at);
    "#,
  )?;
  record_version(&tx, 2, "Preferences and daily entries")?;
  tx.commit()
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<()> {
  conn.execute(
    "INSERT INTO db_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
    params![version, Utc::now().to_rfc3339(), description],
  )?;
  Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<i32> {
  conn.query_row("SELECT COALESCE(MAX(version), 0) FROM db_version", [], |row| row.get(0))
}
