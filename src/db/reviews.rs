//! Review history

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, Result};

use super::{format_timestamp, timestamp_column};
use crate::domain::{FlashcardId, ReviewLog};

pub fn insert_review_log(conn: &Connection, log: &ReviewLog) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO review_logs (flashcard_id, user_id, quality, reviewed_at, interval_before, interval_after)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
        params![
            log.flashcard_id,
            log.user_id,
            log.quality,
            format_timestamp(&log.reviewed_at),
            log.interval_before,
            log.interval_after,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Reviews of a user in `[start, end)`
pub fn count_reviews_between(
    conn: &Connection,
    user_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64> {
    conn.query_row(
        r#"
    SELECT COUNT(*) FROM review_logs
    WHERE user_id = ?1 AND reviewed_at >= ?2 AND reviewed_at < ?3
    "#,
        params![user_id, format_timestamp(&start), format_timestamp(&end)],
        |row| row.get(0),
    )
}

/// Reviews made on the UTC calendar day `day`
pub fn count_reviews_on_day(conn: &Connection, user_id: i64, day: NaiveDate) -> Result<i64> {
    let start = day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    match start {
        Some(start) => count_reviews_between(conn, user_id, start, start + Duration::days(1)),
        None => Ok(0),
    }
}

/// Consecutive UTC days with a review or a daily entry, ending today.
///
/// A streak that last counted yesterday is still alive until today ends.
pub fn study_streak_days(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<i64> {
    let mut stmt = conn.prepare(
        r#"
    SELECT substr(reviewed_at, 1, 10) AS day FROM review_logs WHERE user_id = ?1
    UNION
    SELECT substr(created_at, 1, 10) AS day FROM daily_entries WHERE user_id = ?1
    ORDER BY day DESC
    "#,
    )?;
    let days = stmt
        .query_map(params![user_id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>>>()?;

    let mut days = days
        .iter()
        .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .skip_while(|d| *d > today)
        .peekable();

    let mut expected = match days.peek() {
        Some(first) if *first == today => today,
        Some(first) if Some(*first) == today.pred_opt() => *first,
        _ => return Ok(0),
    };

    let mut streak = 0;
    for day in days {
        if day != expected {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    Ok(streak)
}

/// Review history of one card, oldest first
pub fn list_reviews_for_card(
    conn: &Connection,
    user_id: i64,
    flashcard_id: FlashcardId,
) -> Result<Vec<ReviewLog>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, flashcard_id, user_id, quality, reviewed_at, interval_before, interval_after
    FROM review_logs
    WHERE flashcard_id = ?1 AND user_id = ?2
    ORDER BY reviewed_at ASC, id ASC
    "#,
    )?;
    let logs = stmt
        .query_map(params![flashcard_id, user_id], |row| {
            Ok(ReviewLog {
                id: row.get(0)?,
                flashcard_id: row.get(1)?,
                user_id: row.get(2)?,
                quality: row.get(3)?,
                reviewed_at: timestamp_column(row, 4)?,
                interval_before: row.get(5)?,
                interval_after: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Quality;
    use crate::testing::TestEnv;
    use chrono::TimeZone;

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn log_at(conn: &Connection, user: i64, card: i64, at: DateTime<Utc>) {
        insert_review_log(conn, &ReviewLog::new(card, user, Quality::PERFECT, at, 1, 6)).unwrap();
    }

    #[test]
    fn test_insert_and_list_reviews() {
        let env = TestEnv::new().unwrap();
        let conn = env.conn();
        let user = env.seed_user(&conn, "ana@example.com");
        let subject = env.seed_subject(&conn, user, "Rust");
        let card = env.seed_flashcard(&conn, user, subject, "q", noon(2026, 3, 1));

        log_at(&conn, user, card.id, noon(2026, 3, 2));
        log_at(&conn, user, card.id, noon(2026, 3, 1));

        let logs = list_reviews_for_card(&conn, user, card.id).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].reviewed_at, noon(2026, 3, 1));
        assert_eq!(logs[1].interval_after, 6);
        assert_eq!(logs[1].quality, 5);
    }

    #[test]
    fn test_count_reviews_on_day() {
        let env = TestEnv::new().unwrap();
        let conn = env.conn();
        let user = env.seed_user(&conn, "ana@example.com");
        let subject = env.seed_subject(&conn, user, "Rust");
        let card = env.seed_flashcard(&conn, user, subject, "q", noon(2026, 3, 1));

        log_at(&conn, user, card.id, Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap());
        log_at(&conn, user, card.id, Utc.with_ymd_and_hms(2026, 3, 5, 23, 59, 59).unwrap());
        log_at(&conn, user, card.id, Utc.with_ymd_and_hms(2026, 3, 6, 0, 0, 0).unwrap());

        let day = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(count_reviews_on_day(&conn, user, day).unwrap(), 2);
    }

    #[test]
    fn test_streak_counts_consecutive_days() {
        let env = TestEnv::new().unwrap();
        let conn = env.conn();
        let user = env.seed_user(&conn, "ana@example.com");
        let subject = env.seed_subject(&conn, user, "Rust");
        let card = env.seed_flashcard(&conn, user, subject, "q", noon(2026, 3, 1));

        for day in [10, 9, 9, 8, 6] {
            log_at(&conn, user, card.id, noon(2026, 3, day));
        }

        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(study_streak_days(&conn, user, today).unwrap(), 3);

        // Not yet reviewed today: yesterday's streak still counts
        let tomorrow = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
        assert_eq!(study_streak_days(&conn, user, tomorrow).unwrap(), 3);

        let later = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
        assert_eq!(study_streak_days(&conn, user, later).unwrap(), 0);
    }

    #[test]
    fn test_daily_entries_extend_the_streak() {
        let env = TestEnv::new().unwrap();
        let conn = env.conn();
        let user = env.seed_user(&conn, "ana@example.com");
        let subject = env.seed_subject(&conn, user, "Rust");
        let card = env.seed_flashcard(&conn, user, subject, "q", noon(2026, 3, 1));

        log_at(&conn, user, card.id, noon(2026, 3, 8));
        crate::db::insert_daily_entry(&conn, user, "Iterators", noon(2026, 3, 9)).unwrap();
        crate::db::insert_daily_entry(&conn, user, "Macros", noon(2026, 3, 10)).unwrap();
        log_at(&conn, user, card.id, noon(2026, 3, 10));

        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(study_streak_days(&conn, user, today).unwrap(), 3);
    }

    #[test]
    fn test_streak_is_per_user() {
        let env = TestEnv::new().unwrap();
        let conn = env.conn();
        let ana = env.seed_user(&conn, "ana@example.com");
        let ben = env.seed_user(&conn, "ben@example.com");
        let subject = env.seed_subject(&conn, ana, "Rust");
        let card = env.seed_flashcard(&conn, ana, subject, "q", noon(2026, 3, 1));

        log_at(&conn, ana, card.id, noon(2026, 3, 10));

        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(study_streak_days(&conn, ana, today).unwrap(), 1);
        assert_eq!(study_streak_days(&conn, ben, today).unwrap(), 0);
    }
}
