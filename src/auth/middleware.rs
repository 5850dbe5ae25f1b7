//! Bearer-token authentication extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::Utc;

use super::db as auth_db;
use crate::db::try_lock;
use crate::error::AppError;
use crate::session::hash_token;
use crate::state::AppState;

/// Authenticated request context.
/// Add this as a handler parameter to require authentication.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    /// SHA-256 of the presented token, identifies the session for logout
    pub token_hash: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;

        let token_hash = hash_token(bearer.token());
        let conn = try_lock(&state.db)?;
        let user = auth_db::get_session_user(&conn, &token_hash, Utc::now())?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthContext {
            user_id: user.id,
            email: user.email,
            name: user.name,
            token_hash,
        })
    }
}
