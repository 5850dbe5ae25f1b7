use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Easiness factor every new card starts with
pub const DEFAULT_EASINESS_FACTOR: f64 = 2.5;

/// Floor for the easiness factor; below this intervals would shrink forever
pub const MIN_EASINESS_FACTOR: f64 = 1.3;

/// Longest interval a card may be scheduled out (100 years)
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

/// A stored schedule that breaks one of the scheduling invariants
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleViolation {
  #[error("interval must be between 1 and 36500 days, got {0}")]
  IntervalOutOfRange(i64),
  #[error("easiness factor must be a finite number >= 1.3, got {0}")]
  EasinessBelowFloor(f64),
  #[error("repetitions must be non-negative, got {0}")]
  NegativeRepetitions(i64),
}

/// SM-2 scheduling state of one flashcard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSchedule {
  /// Days until the next review
  pub interval: i64,
  pub easiness_factor: f64,
  /// Consecutive successful reviews, reset on failure
  pub repetitions: i64,
  pub next_review: DateTime<Utc>,
  pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl FlashcardSchedule {
  /// Schedule of a freshly created card: due immediately
  pub fn new(now: DateTime<Utc>) -> Self {
    Self {
      interval: 1,
      easiness_factor: DEFAULT_EASINESS_FACTOR,
      repetitions: 0,
      next_review: now,
      last_reviewed_at: None,
    }
  }

  pub fn validate(&self) -> Result<(), ScheduleViolation> {
    if !(1..=MAX_INTERVAL_DAYS).contains(&self.interval) {
      return Err(ScheduleViolation::IntervalOutOfRange(self.interval));
    }
    // NaN fails this comparison too
    if !(self.easiness_factor.is_finite() && self.easiness_factor >= MIN_EASINESS_FACTOR) {
      return Err(ScheduleViolation::EasinessBelowFloor(self.easiness_factor));
    }
    if self.repetitions < 0 {
      return Err(ScheduleViolation::NegativeRepetitions(self.repetitions));
    }
    Ok(())
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.next_review <= now
  }
}
