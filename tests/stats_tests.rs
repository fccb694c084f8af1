// tests/stats_tests.rs

mod common;

use common::{
    answers_by_position, capitals_quiz, create_quiz, get_quiz, spawn_app, spawn_app_with, stats,
    submit,
};
use quiz_service::config::Config;
use serde_json::{Value, json};

#[tokio::test]
async fn stats_for_quiz_without_attempts_are_zeroed() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let quiz_id = create_quiz(&client, &address, &capitals_quiz()).await;

    let stats = stats(&client, &address, quiz_id, "all").await;

    assert_eq!(stats["totalAttempts"], 0);
    assert_eq!(stats["averageScore"], 0.0);
    assert_eq!(stats["highestScore"], 0.0);
    assert_eq!(stats["passRate"], 0.0);
    assert_eq!(stats["scoreDistribution"], json!([0, 0, 0, 0, 0]));
    assert_eq!(stats["questionNumbers"], json!([1, 2]));
    assert_eq!(stats["questionDetails"][0]["question"], "Capital of France?");
    assert!(stats["questionDetails"][0]["commonWrongAnswer"].is_null());
}

#[tokio::test]
async fn stats_reflect_submitted_attempts_immediately() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let quiz_id = create_quiz(&client, &address, &capitals_quiz()).await;
    let quiz = get_quiz(&client, &address, quiz_id).await;

    // Act: 100%, 50% (Turin), 0% (Lyon, Milan), 50% (Lyon)
    for choice in [[0, 0], [0, 2], [1, 1], [1, 0]] {
        let response = submit(&client, &address, &answers_by_position(&quiz, &choice)).await;
        assert_eq!(response.status().as_u16(), 200);
    }
    let stats = stats(&client, &address, quiz_id, "week").await;

    // Assert
    assert_eq!(stats["totalAttempts"], 4);
    assert_eq!(stats["averageScore"], 50.0);
    assert_eq!(stats["highestScore"], 100.0);
    assert_eq!(stats["passRate"], 25.0);
    assert_eq!(stats["scoreDistribution"], json!([1, 0, 2, 0, 1]));
    assert_eq!(stats["questionSuccessRates"], json!([50.0, 50.0]));
    assert_eq!(stats["questionDetails"][0]["commonWrongAnswer"], "Lyon");
    // Milan and Turin were each chosen once; Milan has the lower id.
    assert_eq!(stats["questionDetails"][1]["commonWrongAnswer"], "Milan");

    let per_day: Vec<i64> = stats["attemptsPerDay"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(per_day.iter().sum::<i64>(), 4);
    assert_eq!(
        stats["attemptDates"].as_array().unwrap().len(),
        per_day.len()
    );
}

#[tokio::test]
async fn unknown_time_range_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let quiz_id = create_quiz(&client, &address, &capitals_quiz()).await;

    let response = client
        .get(&format!("{}/api/quiz/{}/stats?timeRange=decade", address, quiz_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["kind"], "validation");
}

#[tokio::test]
async fn pass_rate_follows_configured_threshold() {
    let client = reqwest::Client::new();

    // Same attempts, 100% and 50%, against the default 60% and a 50% threshold.
    let mut pass_rates = Vec::new();
    for config in [
        Config::default(),
        Config {
            pass_threshold: 50.0,
            ..Config::default()
        },
    ] {
        let address = spawn_app_with(config).await;
        let quiz_id = create_quiz(&client, &address, &capitals_quiz()).await;
        let quiz = get_quiz(&client, &address, quiz_id).await;
        for choice in [[0, 0], [0, 1]] {
            let response = submit(&client, &address, &answers_by_position(&quiz, &choice)).await;
            assert_eq!(response.status().as_u16(), 200);
        }
        let stats = stats(&client, &address, quiz_id, "all").await;
        pass_rates.push(stats["passRate"].clone());
    }

    assert_eq!(pass_rates, vec![json!(50.0), json!(100.0)]);
}

#[tokio::test]
async fn missing_translation_falls_back_to_default_text() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let quiz_id = create_quiz(&client, &address, &capitals_quiz()).await;

    let quiz: Value = client
        .get(&format!("{}/api/quiz/{}?lang=es", address, quiz_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(quiz["title"], "European capitals");
    assert_eq!(quiz["questions"][0]["question"], "Capital of France?");
}

#[tokio::test]
async fn inline_translations_are_served_per_language() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let mut body = capitals_quiz();
    body["translations"] = json!({"es": "Capitales europeas"});
    body["questions"][0]["translations"] = json!({"es": "¿Capital de Francia?"});
    body["questions"][0]["options"][0]["translations"] = json!({"es": "París"});
    let quiz_id = create_quiz(&client, &address, &body).await;

    let spanish: Value = client
        .get(&format!("{}/api/quiz/{}?lang=es", address, quiz_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(spanish["title"], "Capitales europeas");
    assert_eq!(spanish["questions"][0]["question"], "¿Capital de Francia?");
    assert_eq!(spanish["questions"][0]["options"][0]["text"], "París");
    // Untranslated entries keep the default text.
    assert_eq!(spanish["questions"][1]["question"], "Capital of Italy?");

    let list: Vec<Value> = client
        .get(&format!("{}/api/quizzes?lang=es", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list[0]["title"], "Capitales europeas");

    let english = get_quiz(&client, &address, quiz_id).await;
    assert_eq!(english["title"], "European capitals");
}

#[tokio::test]
async fn translations_can_be_added_after_attempts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let quiz_id = create_quiz(&client, &address, &capitals_quiz()).await;
    let quiz = get_quiz(&client, &address, quiz_id).await;

    let response = submit(&client, &address, &answers_by_position(&quiz, &[0, 0])).await;
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .put(&format!("{}/api/quiz/{}/translations/fr", address, quiz_id))
        .json(&json!({
            "title": "Capitales européennes",
            "questions": [{
                "question_id": quiz["questions"][1]["id"],
                "question": "Capitale de l'Italie ?",
                "options": [{"option_id": quiz["questions"][1]["options"][1]["id"], "text": "Milan (fr)"}]
            }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let french: Value = response.json().await.unwrap();
    assert_eq!(french["title"], "Capitales européennes");
    assert_eq!(french["questions"][1]["question"], "Capitale de l'Italie ?");

    let stats: Value = client
        .get(&format!("{}/api/quiz/{}/stats?timeRange=all&lang=fr", address, quiz_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["totalAttempts"], 1);
    assert_eq!(stats["questionDetails"][1]["question"], "Capitale de l'Italie ?");
}

#[tokio::test]
async fn translation_ids_must_belong_to_quiz() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let first = create_quiz(&client, &address, &capitals_quiz()).await;
    let second = create_quiz(&client, &address, &capitals_quiz()).await;
    let other = get_quiz(&client, &address, second).await;

    let response = client
        .put(&format!("{}/api/quiz/{}/translations/de", address, first))
        .json(&json!({
            "questions": [{"question_id": other["questions"][0]["id"], "question": "Hauptstadt?"}]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .put(&format!("{}/api/quiz/{}/translations/not-a-language!", address, first))
        .json(&json!({"title": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn languages_catalogue_is_served() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let languages: Vec<Value> = client
        .get(&format!("{}/api/languages", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(languages.iter().any(|l| l["code"] == "es" && l["name"] == "Spanish"));
}
