use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use studydeck::{app, config::Config, db, state::AppState};

fn server() -> TestServer {
  let pool = db::open_in_memory().unwrap();
  TestServer::new(app::router(AppState::new(pool, Config::default()))).unwrap()
}

async fn register(server: &TestServer, email: &str) -> String {
  let response = server
    .post("/api/auth/register")
    .json(&json!({ "email": email, "name": "Student", "password": "hunter2hunter2" }))
    .await;
  response.assert_status(StatusCode::CREATED);
  response.json::<Value>()["token"].as_str().unwrap().to_string()
}

async fn create_card(server: &TestServer, token: &str, question: &str) -> i64 {
  let subject = server
    .post("/api/subjects")
    .authorization_bearer(token)
    .json(&json!({ "name": "Biology" }))
    .await
    .json::<Value>();

  let card = server
    .post("/api/flashcards")
    .authorization_bearer(token)
    .json(&json!({
      "subjectId": subject["id"],
      "question": question,
      "answer": "The powerhouse of the cell",
    }))
    .await;
  card.assert_status(StatusCode::CREATED);
  card.json::<Value>()["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
  let server = server();
  let response = server.get("/health").await;
  response.assert_status_ok();
  assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_register_login_and_me() {
  let server = server();
  let token = register(&server, "Ana@Example.com").await;

  let me = server.get("/api/auth/me").authorization_bearer(&token).await;
  me.assert_status_ok();
  assert_eq!(me.json::<Value>()["email"], "ana@example.com");

  let duplicate = server
    .post("/api/auth/register")
    .json(&json!({ "email": "ana@example.com", "name": "Ana", "password": "hunter2hunter2" }))
    .await;
  duplicate.assert_status(StatusCode::CONFLICT);
  assert_eq!(duplicate.json::<Value>()["kind"], "conflict");

  let wrong = server
    .post("/api/auth/login")
    .json(&json!({ "email": "ana@example.com", "password": "not the password" }))
    .await;
  wrong.assert_status(StatusCode::UNAUTHORIZED);

  let login = server
    .post("/api/auth/login")
    .json(&json!({ "email": "ANA@example.com", "password": "hunter2hunter2" }))
    .await;
  login.assert_status_ok();
  assert!(login.json::<Value>()["token"].as_str().is_some());
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
  let server = server();

  let response = server.get("/api/subjects").await;
  response.assert_status(StatusCode::UNAUTHORIZED);
  let body = response.json::<Value>();
  assert_eq!(body["kind"], "unauthorized");
  assert!(body["message"].is_string());

  let bogus = server.get("/api/subjects").authorization_bearer("made-up").await;
  bogus.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
  let server = server();
  let token = register(&server, "ana@example.com").await;

  server
    .post("/api/auth/logout")
    .authorization_bearer(&token)
    .await
    .assert_status(StatusCode::NO_CONTENT);

  server
    .get("/api/auth/me")
    .authorization_bearer(&token)
    .await
    .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_subject_with_topics() {
  let server = server();
  let token = register(&server, "ana@example.com").await;

  let invalid = server
    .post("/api/subjects")
    .authorization_bearer(&token)
    .json(&json!({ "name": "   " }))
    .await;
  invalid.assert_status(StatusCode::BAD_REQUEST);
  assert_eq!(invalid.json::<Value>()["kind"], "invalid_input");

  let subject = server
    .post("/api/subjects")
    .authorization_bearer(&token)
    .json(&json!({ "name": "History", "description": "Modern era", "difficulty": "Hard" }))
    .await
    .json::<Value>();
  let id = subject["id"].as_i64().unwrap();

  server
    .post(&format!("/api/subjects/{id}/topics"))
    .authorization_bearer(&token)
    .json(&json!({ "title": "World War I", "content": "1914-1918" }))
    .await
    .assert_status(StatusCode::CREATED);

  let detail = server
    .get(&format!("/api/subjects/{id}"))
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(detail["difficulty"], "Hard");
  assert_eq!(detail["topics"][0]["title"], "World War I");

  let renamed = server
    .put(&format!("/api/subjects/{id}"))
    .authorization_bearer(&token)
    .json(&json!({ "name": "Modern History" }))
    .await;
  renamed.assert_status_ok();
  assert_eq!(renamed.json::<Value>()["name"], "Modern History");

  server
    .delete(&format!("/api/subjects/{id}"))
    .authorization_bearer(&token)
    .await
    .assert_status(StatusCode::NO_CONTENT);
  server
    .get(&format!("/api/subjects/{id}"))
    .authorization_bearer(&token)
    .await
    .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_card_is_due_and_review_reschedules_it() {
  let server = server();
  let token = register(&server, "ana@example.com").await;
  let card_id = create_card(&server, &token, "What is a mitochondrion?").await;

  let card = server
    .get(&format!("/api/flashcards/{card_id}"))
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(card["interval"], 1);
  assert_eq!(card["easinessFactor"], 2.5);
  assert_eq!(card["repetitions"], 0);
  assert!(card["lastReviewedAt"].is_null());

  let due = server
    .get("/api/flashcards/due")
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(due["cardIds"], json!([card_id]));
  assert_eq!(due["flashcards"][0]["id"], card_id);

  let review = server
    .post("/api/reviews")
    .authorization_bearer(&token)
    .json(&json!({ "flashcardId": card_id, "quality": 5 }))
    .await;
  review.assert_status_ok();
  let outcome = review.json::<Value>();
  assert_eq!(outcome["quality"], 5);
  assert_eq!(outcome["schedule"]["interval"], 1);
  assert_eq!(outcome["schedule"]["repetitions"], 1);
  assert!(outcome["schedule"]["lastReviewedAt"].is_string());

  let due = server
    .get("/api/flashcards/due")
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(due["cardIds"], json!([]));

  let dashboard = server
    .get("/api/dashboard")
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(dashboard["totalFlashcards"], 1);
  assert_eq!(dashboard["dueCount"], 0);
  assert_eq!(dashboard["todayRevised"], 1);
  assert_eq!(dashboard["streakDays"], 1);
  assert!(dashboard["nextReviewAt"].is_string());
}

#[tokio::test]
async fn test_invalid_quality_is_rejected() {
  let server = server();
  let token = register(&server, "ana@example.com").await;
  let card_id = create_card(&server, &token, "q").await;

  for quality in [-1, 6] {
    let response = server
      .post("/api/reviews")
      .authorization_bearer(&token)
      .json(&json!({ "flashcardId": card_id, "quality": quality }))
      .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "invalid_input");
  }

  let card = server
    .get(&format!("/api/flashcards/{card_id}"))
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(card["repetitions"], 0);
}

#[tokio::test]
async fn test_mistyped_request_is_invalid_input() {
  let server = server();
  let token = register(&server, "ana@example.com").await;
  let card_id = create_card(&server, &token, "q").await;

  for quality in [json!(3.5), json!(1e30), json!("5")] {
    let response = server
      .post("/api/reviews")
      .authorization_bearer(&token)
      .json(&json!({ "flashcardId": card_id, "quality": quality }))
      .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["kind"], "invalid_input");
    assert!(body["message"].is_string());
  }

  let bad_path = server
    .get("/api/flashcards/not-a-number/preview")
    .authorization_bearer(&token)
    .await;
  bad_path.assert_status(StatusCode::BAD_REQUEST);
  assert_eq!(bad_path.json::<Value>()["kind"], "invalid_input");

  let bad_query = server
    .get("/api/flashcards/due")
    .add_query_param("limit", "many")
    .authorization_bearer(&token)
    .await;
  bad_query.assert_status(StatusCode::BAD_REQUEST);
  assert_eq!(bad_query.json::<Value>()["kind"], "invalid_input");

  let not_json = server
    .post("/api/subjects")
    .authorization_bearer(&token)
    .text("name=Biology")
    .await;
  not_json.assert_status(StatusCode::BAD_REQUEST);
  assert_eq!(not_json.json::<Value>()["kind"], "invalid_input");
}

#[tokio::test]
async fn test_performance_accepts_pass_fail_signal() {
  let server = server();
  let token = register(&server, "ana@example.com").await;
  let card_id = create_card(&server, &token, "q").await;

  let passed = server
    .post(&format!("/api/flashcards/{card_id}/performance"))
    .authorization_bearer(&token)
    .json(&json!({ "isCorrect": true }))
    .await
    .json::<Value>();
  assert_eq!(passed["quality"], 4);
  assert_eq!(passed["schedule"]["repetitions"], 1);

  let failed = server
    .post(&format!("/api/flashcards/{card_id}/performance"))
    .authorization_bearer(&token)
    .json(&json!({ "isCorrect": false }))
    .await
    .json::<Value>();
  assert_eq!(failed["quality"], 1);
  assert_eq!(failed["schedule"]["repetitions"], 0);
  assert_eq!(failed["schedule"]["interval"], 1);
}

#[tokio::test]
async fn test_preview_lists_every_grade() {
  let server = server();
  let token = register(&server, "ana@example.com").await;
  let card_id = create_card(&server, &token, "q").await;

  let preview = server
    .get(&format!("/api/flashcards/{card_id}/preview"))
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  let grades = preview["grades"].as_array().unwrap();
  assert_eq!(grades.len(), 6);
  assert!(grades.iter().all(|g| g["intervalDays"] == 1));
}

#[tokio::test]
async fn test_cards_of_other_users_are_not_found() {
  let server = server();
  let owner = register(&server, "owner@example.com").await;
  let intruder = register(&server, "intruder@example.com").await;
  let card_id = create_card(&server, &owner, "secret").await;

  server
    .get(&format!("/api/flashcards/{card_id}"))
    .authorization_bearer(&intruder)
    .await
    .assert_status(StatusCode::NOT_FOUND);

  let review = server
    .post("/api/reviews")
    .authorization_bearer(&intruder)
    .json(&json!({ "flashcardId": card_id, "quality": 5 }))
    .await;
  review.assert_status(StatusCode::NOT_FOUND);
  assert_eq!(review.json::<Value>()["kind"], "not_found");

  server
    .delete(&format!("/api/flashcards/{card_id}"))
    .authorization_bearer(&intruder)
    .await
    .assert_status(StatusCode::NOT_FOUND);

  let listed = server
    .get("/api/flashcards")
    .authorization_bearer(&intruder)
    .await
    .json::<Value>();
  assert_eq!(listed, json!([]));

  server
    .get(&format!("/api/flashcards/{card_id}"))
    .authorization_bearer(&owner)
    .await
    .assert_status_ok();
}

#[tokio::test]
async fn test_due_limit_and_subject_filter() {
  let server = server();
  let token = register(&server, "ana@example.com").await;
  let first = create_card(&server, &token, "one").await;
  create_card(&server, &token, "two").await;
  create_card(&server, &token, "three").await;

  let limited = server
    .get("/api/flashcards/due")
    .add_query_param("limit", 2)
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(limited["cardIds"].as_array().unwrap().len(), 2);

  let none = server
    .get("/api/flashcards/due")
    .add_query_param("limit", 0)
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(none["cardIds"], json!([]));

  let card = server
    .get(&format!("/api/flashcards/{first}"))
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  let filtered = server
    .get("/api/flashcards/due")
    .add_query_param("subjectId", card["subjectId"].as_i64().unwrap())
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(filtered["cardIds"], json!([first]));
}

#[tokio::test]
async fn test_preferences_roundtrip() {
  let server = server();
  let token = register(&server, "ana@example.com").await;

  let defaults = server
    .get("/api/auth/preferences")
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(defaults, json!({ "reminderTime": "09:00", "studyGoal": 30 }));

  let updated = server
    .put("/api/auth/preferences")
    .authorization_bearer(&token)
    .json(&json!({ "reminderTime": "7:30", "studyGoal": 20 }))
    .await;
  updated.assert_status_ok();
  assert_eq!(updated.json::<Value>()["reminderTime"], "07:30");

  let me = server
    .get("/api/auth/me")
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(me["preferences"]["studyGoal"], 20);

  let invalid = server
    .put("/api/auth/preferences")
    .authorization_bearer(&token)
    .json(&json!({ "reminderTime": "noon", "studyGoal": 20 }))
    .await;
  invalid.assert_status(StatusCode::BAD_REQUEST);
  assert_eq!(invalid.json::<Value>()["kind"], "invalid_input");
}

#[tokio::test]
async fn test_daily_entry_feeds_dashboard() {
  let server = server();
  let token = register(&server, "ana@example.com").await;

  let empty = server
    .post("/api/daily-entries")
    .authorization_bearer(&token)
    .json(&json!({ "topic": "  " }))
    .await;
  empty.assert_status(StatusCode::BAD_REQUEST);

  let entry = server
    .post("/api/daily-entries")
    .authorization_bearer(&token)
    .json(&json!({ "topic": "Pattern matching" }))
    .await;
  entry.assert_status(StatusCode::CREATED);
  assert_eq!(entry.json::<Value>()["topic"], "Pattern matching");

  server
    .post("/api/subjects")
    .authorization_bearer(&token)
    .json(&json!({ "name": "Rust" }))
    .await
    .assert_status(StatusCode::CREATED);

  let dashboard = server
    .get("/api/dashboard")
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(dashboard["streakDays"], 1);
  assert_eq!(dashboard["todayRevised"], 0);
  assert_eq!(dashboard["totalSubjects"], 1);
  assert_eq!(dashboard["subjects"][0]["name"], "Rust");
  assert!(dashboard["dailyPrompt"].is_string());

  let history = server
    .get("/api/daily-entries")
    .authorization_bearer(&token)
    .await
    .json::<Value>();
  assert_eq!(history.as_array().unwrap().len(), 1);
}
