//! Subjects and their topic notes.

use axum::{
  extract::State,
  http::StatusCode,
  Json,
};
use chrono::Utc;

use crate::auth::AuthContext;
use crate::db::{self, try_lock};
use crate::domain::{Subject, Topic};
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation::{SubjectInput, TopicInput};

/// GET /api/subjects
pub async fn list_subjects(
  State(state): State<AppState>,
  auth: AuthContext,
) -> Result<Json<Vec<Subject>>, AppError> {
  let conn = try_lock(&state.db)?;
  Ok(Json(db::list_subjects(&conn, auth.user_id)?))
}

/// POST /api/subjects
pub async fn create_subject(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiJson(input): ApiJson<SubjectInput>,
) -> Result<(StatusCode, Json<Subject>), AppError> {
  let subject = input.validate()?;
  let conn = try_lock(&state.db)?;
  let id = db::insert_subject(&conn, auth.user_id, &subject, Utc::now())?;
  let created = db::get_subject(&conn, auth.user_id, id)?.ok_or(AppError::NotFound("subject"))?;
  tracing::debug!("User {} created subject {}", auth.user_id, id);
  Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/subjects/{id}
pub async fn get_subject(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiPath(id): ApiPath<i64>,
) -> Result<Json<Subject>, AppError> {
  let conn = try_lock(&state.db)?;
  let subject = db::get_subject(&conn, auth.user_id, id)?.ok_or(AppError::NotFound("subject"))?;
  Ok(Json(subject))
}

/// PUT /api/subjects/{id}
pub async fn update_subject(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiPath(id): ApiPath<i64>,
  ApiJson(input): ApiJson<SubjectInput>,
) -> Result<Json<Subject>, AppError> {
  let subject = input.validate()?;
  let conn = try_lock(&state.db)?;
  if !db::update_subject(&conn, auth.user_id, id, &subject, Utc::now())? {
    return Err(AppError::NotFound("subject"));
  }
  let updated = db::get_subject(&conn, auth.user_id, id)?.ok_or(AppError::NotFound("subject"))?;
  Ok(Json(updated))
}

/// DELETE /api/subjects/{id}
pub async fn delete_subject(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
  let conn = try_lock(&state.db)?;
  if !db::delete_subject(&conn, auth.user_id, id)? {
    return Err(AppError::NotFound("subject"));
  }
  tracing::debug!("User {} deleted subject {}", auth.user_id, id);
  Ok(StatusCode::NO_CONTENT)
}

/// POST /api/subjects/{id}/topics
pub async fn create_topic(
  State(state): State<AppState>,
  auth: AuthContext,
  ApiPath(subject_id): ApiPath<i64>,
  ApiJson(input): ApiJson<TopicInput>,
) -> Result<(StatusCode, Json<Topic>), AppError> {
  let topic = input.validate()?;
  let conn = try_lock(&state.db)?;
  let created = db::insert_topic(&conn, auth.user_id, subject_id, &topic, Utc::now())
    .map_err(|e| match e {
      db::StorageError::NotFound => AppError::NotFound("subject"),
      other => other.into(),
    })?;
  Ok((StatusCode::CREATED, Json(created)))
}
