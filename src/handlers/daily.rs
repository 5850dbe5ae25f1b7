//! Daily learning entries.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::auth::AuthContext;
use crate::db::{self, try_lock};
use crate::domain::DailyEntry;
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::state::AppState;
use crate::validation::DailyEntryInput;

/// Entries returned by the history listing
pub const RECENT_ENTRIES: usize = 30;

/// GET /api/daily-entries
pub async fn list_daily_entries(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<Json<Vec<DailyEntry>>, AppError> {
  let conn = try_lock(&state.db)?;
  Ok(Json(db::list_daily_entries(&conn, auth.user_id, RECENT_ENTRIES)?))
}

/// POST /api/daily-entries
pub async fn create_daily_entry(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiJson(input): ApiJson<DailyEntryInput>,
) -> Result<(StatusCode, Json<DailyEntry>), AppError> {
  let topic = input.validate()?;
  let conn = try_lock(&state.db)?;
  let entry = db::insert_daily_entry(&conn, auth.user_id, &topic, Utc::now())?;
  tracing::debug!("User {} added daily entry {}", auth.user_id, entry.id);
  Ok((StatusCode::CREATED, Json(entry)))
}
