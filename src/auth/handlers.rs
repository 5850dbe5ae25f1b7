//! Authentication handlers for register, login, logout, the current user and their preferences.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::db::{self as auth_db, UserInfo};
use super::middleware::AuthContext;
use super::password;
use crate::db::try_lock;
use crate::domain::Preferences;
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::session::{generate_token, hash_token};
use crate::state::AppState;
use crate::validation::{normalize_email, PreferencesInput, RegistrationInput};

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Raw bearer token; shown once, never stored
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserInfo,
}

/// Create a session and return its raw token with the expiry
fn issue_session(
    conn: &Connection,
    user_id: i64,
    session_hours: i64,
    now: DateTime<Utc>,
) -> Result<(String, DateTime<Utc>), AppError> {
    let token = generate_token();
    let expires_at = auth_db::create_session(conn, user_id, &hash_token(&token), session_hours, now)?;
    Ok((token, expires_at))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegistrationInput>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let registration = input.validate()?;
    let password_hash =
        password::hash_password(&registration.password).map_err(AppError::internal)?;
    let now = Utc::now();

    let conn = try_lock(&state.db)?;
    if auth_db::email_exists(&conn, &registration.email)? {
        return Err(AppError::Conflict("email is already registered".to_string()));
    }

    let user_id = auth_db::create_user(
        &conn,
        &registration.email,
        &registration.name,
        &password_hash,
        now,
    )?;
    auth_db::update_last_login(&conn, user_id, now)?;
    let (token, expires_at) = issue_session(&conn, user_id, state.config.session_hours, now)?;
    let user = auth_db::get_user_by_id(&conn, user_id)?
        .ok_or_else(|| AppError::internal("user missing right after insert"))?;

    tracing::info!("Registered user {}", user_id);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            expires_at,
            user,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&input.email).map_err(|_| AppError::Unauthorized)?;

    let stored = {
        let conn = try_lock(&state.db)?;
        auth_db::get_user_by_email(&conn, &email)?
    };
    let Some((user_id, password_hash)) = stored else {
        tracing::debug!("Login for unknown email");
        return Err(AppError::Unauthorized);
    };

    // Verify outside the lock
    if !password::verify_password(&input.password, &password_hash) {
        tracing::debug!("Wrong password for user {}", user_id);
        return Err(AppError::Unauthorized);
    }

    let now = Utc::now();
    let conn = try_lock(&state.db)?;
    auth_db::update_last_login(&conn, user_id, now)?;
    let (token, expires_at) = issue_session(&conn, user_id, state.config.session_hours, now)?;
    let user = auth_db::get_user_by_id(&conn, user_id)?.ok_or(AppError::Unauthorized)?;

    tracing::info!("User {} logged in", user_id);
    Ok(Json(AuthResponse {
        token,
        expires_at,
        user,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<StatusCode, AppError> {
    let conn = try_lock(&state.db)?;
    auth_db::delete_session(&conn, &auth.token_hash)?;
    tracing::info!("User {} logged out", auth.user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<UserInfo>, AppError> {
    let conn = try_lock(&state.db)?;
    let user = auth_db::get_user_by_id(&conn, auth.user_id)?.ok_or(AppError::Unauthorized)?;
    Ok(Json(user))
}

/// GET /api/auth/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Preferences>, AppError> {
    let conn = try_lock(&state.db)?;
    let user = auth_db::get_user_by_id(&conn, auth.user_id)?.ok_or(AppError::Unauthorized)?;
    Ok(Json(user.preferences))
}

/// PUT /api/auth/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(input): ApiJson<PreferencesInput>,
) -> Result<Json<Preferences>, AppError> {
    let prefs = input.validate()?;
    let conn = try_lock(&state.db)?;
    if !auth_db::update_preferences(&conn, auth.user_id, &prefs)? {
        return Err(AppError::Unauthorized);
    }
    tracing::debug!("User {} updated preferences", auth.user_id);
    Ok(Json(prefs))
}
