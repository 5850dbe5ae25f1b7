//! Grading a flashcard: load its schedule, apply SM-2, write it back and log the review.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{ScheduleStore, StorageError};
use crate::domain::{FlashcardId, FlashcardSchedule, Quality, ReviewLog};
use crate::error::AppError;
use crate::srs::sm2;

/// A conflicting concurrent write is retried once before giving up
const MAX_SAVE_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub flashcard_id: FlashcardId,
    pub quality: Quality,
    pub previous: FlashcardSchedule,
    pub schedule: FlashcardSchedule,
}

pub fn submit_review<S: ScheduleStore + ?Sized>(
    store: &S,
    user_id: i64,
    flashcard_id: FlashcardId,
    quality: Quality,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome, AppError> {
    let mut attempt = 1;
    let (previous, schedule) = loop {
        let stored = store.load_schedule(user_id, flashcard_id)?;
        let next = sm2::apply_quality(&stored.schedule, quality, now)?;

        match store.save_schedule(user_id, flashcard_id, stored.version, &next) {
            Ok(_) => break (stored.schedule, next),
            Err(StorageError::Conflict) if attempt < MAX_SAVE_ATTEMPTS => {
                tracing::debug!(
                    "Schedule of card {} changed during review, retrying",
                    flashcard_id
                );
                attempt += 1;
            }
            Err(StorageError::Conflict) => {
                tracing::warn!("Card {} kept changing during review", flashcard_id);
                return Err(AppError::Conflict(
                    "flashcard was reviewed concurrently, try again".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }
    };

    let log = ReviewLog::new(
        flashcard_id,
        user_id,
        quality,
        now,
        previous.interval,
        schedule.interval,
    );
    store.record_review(&log)?;

    tracing::debug!(
        "Reviewed card {} with quality {}: interval {} -> {} days",
        flashcard_id,
        quality.value(),
        previous.interval,
        schedule.interval
    );

    Ok(ReviewOutcome {
        flashcard_id,
        quality,
        previous,
        schedule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoredSchedule;
    use crate::testing::TestEnv;
    use chrono::{Duration, TimeZone};
    use std::cell::{Cell, RefCell};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
    }

    /// In-memory store that reports a concurrent write a set number of times
    struct FlakyStore {
        stored: RefCell<StoredSchedule>,
        conflicts_left: Cell<u32>,
        loads: Cell<u32>,
        logs: RefCell<Vec<ReviewLog>>,
    }

    impl FlakyStore {
        fn new(conflicts: u32) -> Self {
            Self {
                stored: RefCell::new(StoredSchedule {
                    schedule: FlashcardSchedule::new(fixed_now()),
                    version: 0,
                }),
                conflicts_left: Cell::new(conflicts),
                loads: Cell::new(0),
                logs: RefCell::new(Vec::new()),
            }
        }
    }

    impl ScheduleStore for FlakyStore {
        fn load_schedule(&self, _: i64, _: FlashcardId) -> Result<StoredSchedule, StorageError> {
            self.loads.set(self.loads.get() + 1);
            Ok(*self.stored.borrow())
        }

        fn save_schedule(
            &self,
            _: i64,
            _: FlashcardId,
            expected_version: i64,
            schedule: &FlashcardSchedule,
        ) -> Result<i64, StorageError> {
            let mut stored = self.stored.borrow_mut();
            if self.conflicts_left.get() > 0 {
                // Someone else wrote first
                self.conflicts_left.set(self.conflicts_left.get() - 1);
                stored.version += 1;
                return Err(StorageError::Conflict);
            }
            if stored.version != expected_version {
                return Err(StorageError::Conflict);
            }
            stored.schedule = *schedule;
            stored.version += 1;
            Ok(stored.version)
        }

        fn record_review(&self, log: &ReviewLog) -> Result<i64, StorageError> {
            self.logs.borrow_mut().push(log.clone());
            Ok(self.logs.borrow().len() as i64)
        }
    }

    #[test]
    fn test_clean_review_saves_once() {
        let store = FlakyStore::new(0);
        let outcome = submit_review(&store, 1, 7, Quality::PERFECT, fixed_now()).unwrap();

        assert_eq!(store.loads.get(), 1);
        assert_eq!(outcome.previous, FlashcardSchedule::new(fixed_now()));
        assert_eq!(outcome.schedule.repetitions, 1);
        assert_eq!(outcome.schedule.next_review, fixed_now() + Duration::days(1));
        assert_eq!(store.stored.borrow().schedule, outcome.schedule);
        assert_eq!(store.logs.borrow().len(), 1);
    }

    #[test]
    fn test_conflict_is_retried_once() {
        let store = FlakyStore::new(1);
        let outcome = submit_review(&store, 1, 7, Quality::PERFECT, fixed_now()).unwrap();

        assert_eq!(store.loads.get(), 2);
        assert_eq!(store.stored.borrow().version, 2);
        assert_eq!(store.stored.borrow().schedule, outcome.schedule);
        assert_eq!(store.logs.borrow().len(), 1);
    }

    #[test]
    fn test_repeated_conflict_gives_up() {
        let store = FlakyStore::new(2);
        let err = submit_review(&store, 1, 7, Quality::PERFECT, fixed_now()).unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.loads.get(), 2);
        assert!(store.logs.borrow().is_empty());
    }

    #[test]
    fn test_review_against_database() {
        let env = TestEnv::new().unwrap();
        let conn = env.conn();
        let user = env.seed_user(&conn, "ana@example.com");
        let subject = env.seed_subject(&conn, user, "Rust");
        let card = env.seed_flashcard(&conn, user, subject, "q", fixed_now());

        let grade = |q: u8, at| submit_review(&*conn, user, card.id, Quality::try_from(q).unwrap(), at);
        grade(5, fixed_now()).unwrap();
        grade(5, fixed_now() + Duration::days(1)).unwrap();
        let third = grade(5, fixed_now() + Duration::days(7)).unwrap();

        assert_eq!(third.previous.interval, 6);
        assert_eq!(third.schedule.interval, 17);
        assert_eq!(third.schedule.repetitions, 3);
        assert!((third.schedule.easiness_factor - 2.8).abs() < 1e-9);

        let failed = grade(1, fixed_now() + Duration::days(24)).unwrap();
        assert_eq!(failed.schedule.interval, 1);
        assert_eq!(failed.schedule.repetitions, 0);

        let logs = crate::db::list_reviews_for_card(&conn, user, card.id).unwrap();
        let intervals: Vec<_> = logs.iter().map(|l| (l.interval_before, l.interval_after)).collect();
        assert_eq!(intervals, vec![(1, 1), (1, 6), (6, 17), (17, 1)]);
    }

    #[test]
    fn test_review_of_other_users_card_is_not_found() {
        let env = TestEnv::new().unwrap();
        let conn = env.conn();
        let owner = env.seed_user(&conn, "owner@example.com");
        let other = env.seed_user(&conn, "other@example.com");
        let subject = env.seed_subject(&conn, owner, "Rust");
        let card = env.seed_flashcard(&conn, owner, subject, "q", fixed_now());

        let err = submit_review(&*conn, other, card.id, Quality::PERFECT, fixed_now()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(crate::db::load_schedule(&conn, owner, card.id).unwrap().version, 0);
    }
}
