use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studydeck::{app, auth, config::Config, db, db::LogOnError, state::AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "studydeck=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::load().expect("Failed to load configuration");
  tracing::info!("Using database at {}", config.database_path.display());

  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");

  {
    let conn = db::try_lock(&pool).expect("Database lock failed during startup");
    if let Some(removed) =
      auth::db::cleanup_expired_sessions(&conn, Utc::now()).log_warn("Failed to purge expired sessions")
    {
      tracing::info!("Purged {} expired sessions", removed);
    }
  }

  let bind_addr = config.bind_addr();
  let app = app::router(AppState::new(pool, config));

  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://{}", bind_addr);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
