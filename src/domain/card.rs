use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FlashcardSchedule;

pub type FlashcardId = i64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty {0:?}")]
pub struct UnknownDifficulty(pub String);

/// Self-reported difficulty of a subject, topic or card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
}

impl Difficulty {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "Easy" | "easy" => Some(Self::Easy),
      "Medium" | "medium" => Some(Self::Medium),
      "Hard" | "hard" => Some(Self::Hard),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Easy => "Easy",
      Self::Medium => "Medium",
      Self::Hard => "Hard",
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
  pub id: FlashcardId,
  pub user_id: i64,
  pub subject_id: i64,
  pub question: String,
  pub answer: String,
  pub difficulty: Difficulty,
  /// True if the card came from automatic generation rather than the user
  pub is_generated: bool,
  pub created_at: DateTime<Utc>,

  #[serde(flatten)]
  pub schedule: FlashcardSchedule,
  /// Bumped on every schedule write; used to detect concurrent reviews
  #[serde(skip)]
  pub schedule_version: i64,
}

impl Flashcard {
  pub fn new(
    user_id: i64,
    subject_id: i64,
    question: String,
    answer: String,
    difficulty: Difficulty,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      id: 0,
      user_id,
      subject_id,
      question,
      answer,
      difficulty,
      is_generated: false,
      created_at: now,
      schedule: FlashcardSchedule::new(now),
      schedule_version: 0,
    }
  }
}
