use axum::{extract::State, Json};
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use crate::auth::AuthContext;
use crate::db::{self, try_lock, DashboardStats};
use crate::domain::Subject;
use crate::error::AppError;
use crate::state::AppState;

pub const DAILY_PROMPTS: [&str; 5] = [
  "What did you learn today?",
  "What concept would you like to revise?",
  "Any new insights to add?",
  "What topic challenged you today?",
  "Ready to add today's learning?",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
  #[serde(flatten)]
  pub stats: DashboardStats,
  /// Newest first
  pub subjects: Vec<Subject>,
  pub daily_prompt: &'static str,
}

fn pick_prompt() -> &'static str {
  DAILY_PROMPTS[rand::rng().random_range(0..DAILY_PROMPTS.len())]
}

/// GET /api/dashboard
pub async fn dashboard(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<Json<DashboardResponse>, AppError> {
  let conn = try_lock(&state.db)?;
  let stats = db::get_dashboard_stats(&conn, auth.user_id, Utc::now())?;
  let subjects = db::list_subjects(&conn, auth.user_id)?;
  Ok(Json(DashboardResponse {
    stats,
    subjects,
    daily_prompt: pick_prompt(),
  }))
}
