//! Grading endpoints.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthContext;
use crate::db::try_lock;
use crate::domain::{FlashcardId, Quality};
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::services::{self, ReviewOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
  pub flashcard_id: FlashcardId,
  pub quality: i64,
}

/// Either a 0-5 grade or the older got-it/missed-it signal
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInput {
  pub quality: Option<i64>,
  pub is_correct: Option<bool>,
}

impl PerformanceInput {
  /// An explicit grade wins over `isCorrect`
  pub fn quality(&self) -> Result<Quality, AppError> {
    match (self.quality, self.is_correct) {
      (Some(q), _) => Ok(Quality::try_from(q)?),
      (None, Some(is_correct)) => Ok(Quality::from_outcome(is_correct)),
      (None, None) => Err(AppError::InvalidInput(
        "either quality or isCorrect is required".to_string(),
      )),
    }
  }
}

/// Grade one card inside a transaction so the schedule and its log commit together
fn review_card(
  state: &AppState,
  user_id: i64,
  flashcard_id: FlashcardId,
  quality: Quality,
) -> Result<ReviewOutcome, AppError> {
  let conn = try_lock(&state.db)?;
  let tx = conn.unchecked_transaction()?;
  let outcome = services::submit_review(&*tx, user_id, flashcard_id, quality, Utc::now())
    .map_err(|e| match e {
      AppError::NotFound(_) => AppError::NotFound("flashcard"),
      other => other,
    })?;
  tx.commit()?;
  Ok(outcome)
}

/// POST /api/reviews
pub async fn submit_review(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiJson(input): ApiJson<ReviewInput>,
) -> Result<Json<ReviewOutcome>, AppError> {
  let quality = Quality::try_from(input.quality)?;
  Ok(Json(review_card(&state, auth.user_id, input.flashcard_id, quality)?))
}

/// POST /api/flashcards/{id}/performance
pub async fn record_performance(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiPath(id): ApiPath<FlashcardId>,
  ApiJson(input): ApiJson<PerformanceInput>,
) -> Result<Json<ReviewOutcome>, AppError> {
  let quality = input.quality()?;
  Ok(Json(review_card(&state, auth.user_id, id, quality)?))
}
