//! Flashcard CRUD, the due queue and grade previews.

use axum::{
  extract::State,
  http::StatusCode,
  Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::auth::AuthContext;
use crate::db::{self, try_lock, StorageError};
use crate::domain::{Flashcard, FlashcardId, Quality};
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::srs::{self, sm2};
use crate::state::AppState;
use crate::validation::FlashcardInput;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
  pub subject_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueQuery {
  pub limit: Option<usize>,
  pub subject_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueResponse {
  /// Review order: most overdue first
  pub card_ids: Vec<FlashcardId>,
  pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradePreview {
  pub quality: u8,
  pub interval_days: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
  pub flashcard_id: FlashcardId,
  pub grades: Vec<GradePreview>,
}

/// GET /api/flashcards?subjectId=
pub async fn list_flashcards(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<Flashcard>>, AppError> {
  let conn = try_lock(&state.db)?;
  Ok(Json(db::list_flashcards(&conn, auth.user_id, query.subject_id)?))
}

/// POST /api/flashcards
pub async fn create_flashcard(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiJson(input): ApiJson<FlashcardInput>,
) -> Result<(StatusCode, Json<Flashcard>), AppError> {
  let card = input.validate()?;
  let conn = try_lock(&state.db)?;
  let created = db::insert_flashcard(&conn, auth.user_id, &card, Utc::now()).map_err(|e| match e {
    StorageError::NotFound => AppError::NotFound("subject"),
    other => other.into(),
  })?;
  tracing::debug!("User {} created flashcard {}", auth.user_id, created.id);
  Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/flashcards/{id}
pub async fn get_flashcard(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiPath(id): ApiPath<FlashcardId>,
) -> Result<Json<Flashcard>, AppError> {
  let conn = try_lock(&state.db)?;
  let card = db::get_flashcard(&conn, auth.user_id, id)?.ok_or(AppError::NotFound("flashcard"))?;
  Ok(Json(card))
}

/// DELETE /api/flashcards/{id}
pub async fn delete_flashcard(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiPath(id): ApiPath<FlashcardId>,
) -> Result<StatusCode, AppError> {
  let conn = try_lock(&state.db)?;
  if !db::delete_flashcard(&conn, auth.user_id, id)? {
    return Err(AppError::NotFound("flashcard"));
  }
  Ok(StatusCode::NO_CONTENT)
}

/// GET /api/flashcards/due?limit=&subjectId=
pub async fn due_flashcards(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiQuery(query): ApiQuery<DueQuery>,
) -> Result<Json<DueResponse>, AppError> {
  let limit = state.config.due_limit(query.limit);
  let now = Utc::now();

  let cards = {
    let conn = try_lock(&state.db)?;
    db::list_flashcards(&conn, auth.user_id, query.subject_id)?
  };

  let schedules: Vec<_> = cards.iter().map(|c| (c.id, c.schedule)).collect();
  let card_ids: Vec<FlashcardId> = srs::select_due(&schedules, now, Some(limit)).collect();

  let mut by_id: HashMap<FlashcardId, Flashcard> = cards.into_iter().map(|c| (c.id, c)).collect();
  let flashcards = card_ids.iter().filter_map(|id| by_id.remove(id)).collect();

  Ok(Json(DueResponse {
    card_ids,
    flashcards,
  }))
}

/// GET /api/flashcards/{id}/preview
pub async fn preview_flashcard(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiPath(id): ApiPath<FlashcardId>,
) -> Result<Json<PreviewResponse>, AppError> {
  let stored = {
    let conn = try_lock(&state.db)?;
    db::load_schedule(&conn, auth.user_id, id).map_err(|e| match e {
      StorageError::NotFound => AppError::NotFound("flashcard"),
      other => other.into(),
    })?
  };

  let intervals = sm2::preview(&stored.schedule, Utc::now())?;
  let grades = Quality::all()
    .into_iter()
    .zip(intervals)
    .map(|(quality, interval_days)| GradePreview {
      quality: quality.value(),
      interval_days,
    })
    .collect();

  Ok(Json(PreviewResponse {
    flashcard_id: id,
    grades,
  }))
}
