//! SM-2 review scheduling.
//!
//! Given a card's current schedule and a 0-5 recall grade, computes the next
//! schedule. Pure: the caller supplies `now` and persists the result.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{
  FlashcardSchedule, Quality, QualityOutOfRange, ScheduleViolation, MAX_INTERVAL_DAYS,
  MIN_EASINESS_FACTOR,
};

/// Interval after the first successful recall
const FIRST_INTERVAL_DAYS: i64 = 1;

/// Interval after the second consecutive successful recall
const SECOND_INTERVAL_DAYS: i64 = 6;

/// Both variants are caller bugs or corrupt data; neither is worth retrying
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
  #[error("invalid input: {0}")]
  InvalidInput(String),
  #[error("invalid schedule state: {0}")]
  InvalidState(#[from] ScheduleViolation),
}

impl From<QualityOutOfRange> for SchedulerError {
  fn from(e: QualityOutOfRange) -> Self {
    SchedulerError::InvalidInput(e.to_string())
  }
}

/// Apply a raw 0-5 grade to `current`.
pub fn apply(
  current: &FlashcardSchedule,
  quality: u8,
  now: DateTime<Utc>,
) -> Result<FlashcardSchedule, SchedulerError> {
  let quality = Quality::try_from(quality)?;
  apply_quality(current, quality, now)
}

/// Apply an already-validated grade to `current`.
pub fn apply_quality(
  current: &FlashcardSchedule,
  quality: Quality,
  now: DateTime<Utc>,
) -> Result<FlashcardSchedule, SchedulerError> {
  current.validate()?;

  let easiness_factor = next_easiness_factor(current.easiness_factor, quality);

  let (interval, repetitions) = if quality.is_pass() {
    let repetitions = current.repetitions.saturating_add(1);
    let interval = match repetitions {
      1 => FIRST_INTERVAL_DAYS,
      2 => SECOND_INTERVAL_DAYS,
      _ => ((current.interval as f64) * easiness_factor).round() as i64,
    };
    (interval.clamp(1, MAX_INTERVAL_DAYS), repetitions)
  } else {
    // Failed recall restarts the learning sequence
    (FIRST_INTERVAL_DAYS, 0)
  };

  let next_review = now
    .checked_add_signed(Duration::days(interval))
    .ok_or_else(|| SchedulerError::InvalidInput(format!("review time {} is out of range", now)))?;

  Ok(FlashcardSchedule {
    interval,
    easiness_factor,
    repetitions,
    next_review,
    last_reviewed_at: Some(now),
  })
}

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3
pub fn next_easiness_factor(easiness_factor: f64, quality: Quality) -> f64 {
  let miss = 5.0 - f64::from(quality.value());
  let ease_delta = 0.1 - miss * (0.08 + miss * 0.02);
  (easiness_factor + ease_delta).max(MIN_EASINESS_FACTOR)
}

/// Interval in days each grade 0..=5 would produce, for answer-button hints.
pub fn preview(current: &FlashcardSchedule, now: DateTime<Utc>) -> Result<[i64; 6], SchedulerError> {
  let mut intervals = [0; 6];
  for (slot, quality) in intervals.iter_mut().zip(Quality::all()) {
    *slot = apply_quality(current, quality, now)?.interval;
  }
  Ok(intervals)
}
