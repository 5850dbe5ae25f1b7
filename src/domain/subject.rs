use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Difficulty;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  pub id: i64,
  pub user_id: i64,
  pub name: String,
  pub description: Option<String>,
  pub difficulty: Difficulty,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  /// Only filled in by the detail query
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub topics: Vec<Topic>,
}

/// A block of notes attached to a subject
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
  pub id: i64,
  pub subject_id: i64,
  pub title: String,
  pub content: String,
  pub difficulty: Difficulty,
  pub created_at: DateTime<Utc>,
}
