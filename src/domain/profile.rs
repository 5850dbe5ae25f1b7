use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REMINDER_TIME: &str = "09:00";

/// Minutes per day
pub const DEFAULT_STUDY_GOAL: i64 = 30;

/// Per-user study settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
  /// Local wall-clock time, `HH:MM`
  pub reminder_time: String,
  pub study_goal: i64,
}

impl Default for Preferences {
  fn default() -> Self {
    Self {
      reminder_time: DEFAULT_REMINDER_TIME.to_string(),
      study_goal: DEFAULT_STUDY_GOAL,
    }
  }
}

/// "What did you learn today?" answer; any entry keeps the day's streak alive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
  pub id: i64,
  pub user_id: i64,
  pub topic: String,
  pub created_at: DateTime<Utc>,
}
