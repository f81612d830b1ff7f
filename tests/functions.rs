mod common;

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn analysis_request() -> Value {
    json!({
        "userProfile": {"dateOfBirth": "", "handPreference": "right"},
        "palmImageBase64": "data:image/jpeg;base64,AAAA"
    })
}

#[tokio::test]
async fn generate_palm_reading_returns_analysis_data() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_string_contains("\"detail\":\"high\""))
        .and(body_string_contains("\"model\":\"gpt-4o\""))
        .respond_with(common::completion(&common::analysis_json().to_string()))
        .expect(1)
        .mount(&app.openai)
        .await;

    let response = app
        .client
        .post(app.url("/functions/v1/generate-palm-reading"))
        .json(&analysis_request())
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["analysisData"]["lifePath"]["score"], 78);
    assert!(body["analysisData"]["palmLines"]["fateLine"].is_object());
}

#[tokio::test]
async fn unusable_photo_is_a_bad_request() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(common::completion(
            "```json\n{\"error\": \"Please upload a clear photo of a palm\"}\n```",
        ))
        .mount(&app.openai)
        .await;

    let response = app
        .client
        .post(app.url("/functions/v1/generate-palm-reading"))
        .json(&analysis_request())
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Please upload a clear photo of a palm");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn unparseable_answer_is_a_server_error() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(common::completion("The palm shows a long life."))
        .mount(&app.openai)
        .await;

    let response = app
        .client
        .post(app.url("/functions/v1/generate-palm-reading"))
        .json(&analysis_request())
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Invalid response format from AI - could not parse analysis data"
    );
    assert_eq!(body["details"], "Check the function logs for more information");
}

#[tokio::test]
async fn invalid_provider_key_is_reported() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.openai)
        .await;

    let response = app
        .client
        .post(app.url("/functions/v1/generate-palm-reading"))
        .json(&analysis_request())
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Invalid OpenAI API key"));
}

#[tokio::test]
async fn chat_with_ai_answers() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("\"model\":\"gpt-4o-mini\""))
        .and(body_string_contains("\"max_tokens\":500"))
        .respond_with(common::completion("Love finds you in spring."))
        .expect(1)
        .mount(&app.openai)
        .await;

    let response = app
        .client
        .post(app.url("/functions/v1/chat-with-ai"))
        .json(&json!({
            "message": "When will I find true love?",
            "palmAnalysis": common::analysis_json(),
            "userProfile": {"handPreference": "left"},
            "chatHistory": [
                {"message_type": "assistant", "content": "Hello!"},
                {"message_type": "user", "content": "When will I find true love?"}
            ]
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["response"], "Love finds you in spring.");
}

#[tokio::test]
async fn chat_with_ai_failure_is_a_server_error() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&app.openai)
        .await;

    let response = app
        .client
        .post(app.url("/functions/v1/chat-with-ai"))
        .json(&json!({"message": "Hi"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("quota"));
}
