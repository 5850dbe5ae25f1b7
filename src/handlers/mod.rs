pub mod daily;
pub mod dashboard;
pub mod flashcards;
pub mod reviews;
pub mod subjects;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::db::try_lock;
use crate::error::AppError;
use crate::state::AppState;

pub use daily::*;
pub use dashboard::*;
pub use flashcards::*;
pub use reviews::*;
pub use subjects::*;

#[derive(Debug, Serialize)]
pub struct Health {
  pub status: &'static str,
  pub version: &'static str,
}

/// GET /health - liveness, including a trivial database round trip
pub async fn health(State(state): State<AppState>) -> Result<Json<Health>, AppError> {
  let conn = try_lock(&state.db)?;
  conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
  Ok(Json(Health {
    status: "ok",
    version: env!("CARGO_PKG_VERSION"),
  }))
}
