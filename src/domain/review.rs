use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Grade outside the 0-5 recall scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("quality must be an integer between 0 and 5, got {0}")]
pub struct QualityOutOfRange(pub i64);

/// Recall grade, 0 (complete blackout) through 5 (perfect recall)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quality(u8);

impl Quality {
  pub const BLACKOUT: Quality = Quality(0);
  pub const PERFECT: Quality = Quality(5);

  /// Lowest grade that counts as a successful recall
  pub const PASS_THRESHOLD: u8 = 3;

  pub fn value(self) -> u8 {
    self.0
  }

  pub fn is_pass(self) -> bool {
    self.0 >= Self::PASS_THRESHOLD
  }

  /// Map the binary got-it/missed-it signal onto the grade scale
  pub fn from_outcome(is_correct: bool) -> Self {
    if is_correct { Quality(4) } else { Quality(1) }
  }

  /// All six grades in ascending order
  pub fn all() -> [Quality; 6] {
    [Quality(0), Quality(1), Quality(2), Quality(3), Quality(4), Quality(5)]
  }
}

impl TryFrom<i64> for Quality {
  type Error = QualityOutOfRange;

  fn try_from(value: i64) -> Result<Self, Self::Error> {
    match value {
      0..=5 => Ok(Quality(value as u8)),
      _ => Err(QualityOutOfRange(value)),
    }
  }
}

impl TryFrom<u8> for Quality {
  type Error = QualityOutOfRange;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Quality::try_from(i64::from(value))
  }
}

/// One graded review, kept for history and streak stats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
  pub id: i64,
  pub flashcard_id: i64,
  pub user_id: i64,
  pub quality: u8,
  pub reviewed_at: DateTime<Utc>,
  pub interval_before: i64,
  pub interval_after: i64,
}

impl ReviewLog {
  pub fn new(
    flashcard_id: i64,
    user_id: i64,
    quality: Quality,
    reviewed_at: DateTime<Utc>,
    interval_before: i64,
    interval_after: i64,
  ) -> Self {
    Self {
      id: 0,
      flashcard_id,
      user_id,
      quality: quality.value(),
      reviewed_at,
      interval_before,
      interval_after,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_quality_accepts_scale() {
    for value in 0u8..=5 {
      assert_eq!(Quality::try_from(value).unwrap().value(), value);
    }
  }

  #[test]
  fn test_quality_rejects_six() {
    assert_eq!(Quality::try_from(6u8), Err(QualityOutOfRange(6)));
  }

  #[test]
  fn test_quality_rejects_negative() {
    assert_eq!(Quality::try_from(-1i64), Err(QualityOutOfRange(-1)));
  }

  #[test]
  fn test_quality_rejects_large() {
    assert!(Quality::try_from(255u8).is_err());
    assert!(Quality::try_from(i64::MAX).is_err());
  }

  #[test]
  fn test_quality_pass_threshold() {
    assert!(!Quality::try_from(0u8).unwrap().is_pass());
    assert!(!Quality::try_from(2u8).unwrap().is_pass());
    assert!(Quality::try_from(3u8).unwrap().is_pass());
    assert!(Quality::PERFECT.is_pass());
  }

  #[test]
  fn test_quality_from_outcome() {
    assert_eq!(Quality::from_outcome(true).value(), 4);
    assert_eq!(Quality::from_outcome(false).value(), 1);
    assert!(Quality::from_outcome(true).is_pass());
    assert!(!Quality::from_outcome(false).is_pass());
  }

  #[test]
  fn test_quality_all_is_ordered() {
    let all = Quality::all();
    assert_eq!(all.len(), 6);
    assert!(all.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(all[0], Quality::BLACKOUT);
  }

  #[test]
  fn test_review_log_new() {
    let now = Utc::now();
    let log = ReviewLog::new(7, 3, Quality::PERFECT, now, 1, 6);
    assert_eq!(log.id, 0);
    assert_eq!(log.flashcard_id, 7);
    assert_eq!(log.user_id, 3);
    assert_eq!(log.quality, 5);
    assert_eq!(log.reviewed_at, now);
    assert_eq!(log.interval_before, 1);
    assert_eq!(log.interval_after, 6);
  }
}
