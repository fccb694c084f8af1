// tests/common/mod.rs

#![allow(dead_code)]

use quiz_service::{config::Config, db, routes, state::AppState};
use serde_json::{Value, json};

/// Spawns the app on a random port over a fresh in-memory database.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app() -> String {
    spawn_app_with(Config {
        rust_log: "error".to_string(),
        ..Config::default()
    })
    .await
}

pub async fn spawn_app_with(config: Config) -> String {
    // 1. Create a pool
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to open in-memory SQLite");

    // 2. Run migrations
    db::migrate(&pool).await.expect("Failed to migrate database");

    // 3. Create the router with the app state
    let app = routes::create_router(AppState::new(pool, config));

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Two questions with four options each; the first option of each is correct.
pub fn capitals_quiz() -> Value {
    json!({
        "title": "European capitals",
        "questions": [
            {
                "question": "Capital of France?",
                "options": [
                    {"text": "Paris", "isCorrect": true},
                    {"text": "Lyon", "isCorrect": false},
                    {"text": "Nice", "isCorrect": false},
                    {"text": "Lille", "isCorrect": false}
                ]
            },
            {
                "question": "Capital of Italy?",
                "options": [
                    {"text": "Rome", "isCorrect": true},
                    {"text": "Milan", "isCorrect": false},
                    {"text": "Turin", "isCorrect": false},
                    {"text": "Naples", "isCorrect": false}
                ]
            }
        ]
    })
}

/// Creates a quiz and returns its id.
pub async fn create_quiz(client: &reqwest::Client, address: &str, body: &Value) -> i64 {
    let response = client
        .post(format!("{}/api/create_quiz", address))
        .json(body)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    created["quiz_id"].as_i64().expect("quiz_id missing")
}

pub async fn get_quiz(client: &reqwest::Client, address: &str, quiz_id: i64) -> Value {
    client
        .get(format!("{}/api/quiz/{}", address, quiz_id))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap()
}

/// Builds answers choosing option `choice[i]` (by position) for question `i`.
pub fn answers_by_position(quiz: &Value, choice: &[usize]) -> Value {
    let answers: Vec<Value> = quiz["questions"]
        .as_array()
        .unwrap()
        .iter()
        .zip(choice)
        .map(|(q, &pos)| {
            json!({
                "question_id": q["id"],
                "selected_option_id": q["options"][pos]["id"]
            })
        })
        .collect();
    json!({ "quiz_id": quiz["id"], "answers": answers })
}

pub async fn submit(client: &reqwest::Client, address: &str, body: &Value) -> reqwest::Response {
    client
        .post(format!("{}/api/quiz/attempt", address))
        .json(body)
        .send()
        .await
        .expect("Failed to execute request")
}

pub async fn stats(client: &reqwest::Client, address: &str, quiz_id: i64, range: &str) -> Value {
    let response = client
        .get(format!("{}/api/quiz/{}/stats?timeRange={}", address, quiz_id, range))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    response.json().await.unwrap()
}
