//! Dashboard statistics

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result};
use serde::Serialize;

/// Per-user study overview
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_subjects: i64,
    pub total_flashcards: i64,
    pub due_count: i64,
    pub today_revised: i64,
    pub streak_days: i64,
    /// Earliest review that is not yet due
    pub next_review_at: Option<DateTime<Utc>>,
}

pub fn get_dashboard_stats(
    conn: &Connection,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<DashboardStats> {
    let today = now.date_naive();
    Ok(DashboardStats {
        total_subjects: super::count_subjects(conn, user_id)?,
        total_flashcards: super::count_flashcards(conn, user_id)?,
        due_count: super::get_due_count(conn, user_id, now)?,
        today_revised: super::count_reviews_on_day(conn, user_id, today)?,
        streak_days: super::study_streak_days(conn, user_id, today)?,
        next_review_at: super::get_next_review_time(conn, user_id, now)?,
    })
}
