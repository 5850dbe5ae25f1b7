//! Router assembly, shared by the binary and the integration tests.

use axum::{
  routing::{get, post},
  Router,
};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
  let api = Router::new()
    .route("/auth/register", post(auth::register))
    .route("/auth/login", post(auth::login))
    .route("/auth/logout", post(auth::logout))
    .route("/auth/me", get(auth::me))
    .route(
      "/auth/preferences",
      get(auth::get_preferences).put(auth::update_preferences),
    )
    .route("/subjects", get(handlers::list_subjects).post(handlers::create_subject))
    .route(
      "/subjects/{id}",
      get(handlers::get_subject)
        .put(handlers::update_subject)
        .delete(handlers::delete_subject),
    )
    .route("/subjects/{id}/topics", post(handlers::create_topic))
    .route("/flashcards", get(handlers::list_flashcards).post(handlers::create_flashcard))
    .route("/flashcards/due", get(handlers::due_flashcards))
    .route(
      "/flashcards/{id}",
      get(handlers::get_flashcard).delete(handlers::delete_flashcard),
    )
    .route("/flashcards/{id}/preview", get(handlers::preview_flashcard))
    .route("/flashcards/{id}/performance", post(handlers::record_performance))
    .route("/reviews", post(handlers::submit_review))
    .route(
      "/daily-entries",
      get(handlers::list_daily_entries).post(handlers::create_daily_entry),
    )
    .route("/dashboard", get(handlers::dashboard));

  Router::new()
    .route("/health", get(handlers::health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
