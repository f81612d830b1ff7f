mod common;

use base64::{engine::general_purpose, Engine as _};
use image::GenericImageView;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, ResponseTemplate};

async fn accept_storage_writes(app: &common::TestApp) {
    Mock::given(method("POST"))
        .and(path_regex(r"^/object/palm-images/user-1/\d+\.jpg$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "palm-images/x"})))
        .expect(1)
        .mount(&app.storage)
        .await;
}

async fn answer_analysis(app: &common::TestApp, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(common::completion(content))
        .mount(&app.openai)
        .await;
}

fn preview_dimensions(workflow: &Value) -> (u32, u32) {
    let preview = workflow["preview"].as_str().expect("no preview");
    let encoded = preview
        .strip_prefix("data:image/jpeg;base64,")
        .expect("preview is not a jpeg data uri");
    let bytes = general_purpose::STANDARD.decode(encoded).unwrap();
    image::load_from_memory(&bytes).unwrap().dimensions()
}

#[tokio::test]
async fn large_photo_is_compressed_and_stored() {
    let app = common::spawn_app().await;
    accept_storage_writes(&app).await;

    let response = app.upload_photo(4000, 2000).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Image uploaded successfully!");
    assert_eq!(body["item"]["step"], "profile");
    assert_eq!(preview_dimensions(&body["item"]), (800, 400));
    assert!(body["item"]["image_key"]
        .as_str()
        .unwrap()
        .starts_with("user-1/"));
}

#[tokio::test]
async fn oversized_file_is_rejected_without_network_calls() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.storage)
        .await;

    let response = app
        .post("/upload")
        .header("Content-Type", "image/png")
        .header("X-File-Name", "huge.png")
        .body(vec![0u8; 10 * 1024 * 1024])
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Please select an image smaller than 5MB.");

    let workflow = app.workflow().await;
    assert_eq!(workflow["step"], "upload");
    assert_eq!(workflow["notice"]["title"], "File too large");
}

#[tokio::test]
async fn non_image_is_rejected() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.storage)
        .await;

    let response = app
        .post("/upload")
        .header("Content-Type", "application/pdf")
        .body(b"%PDF-1.4".to_vec())
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Please select an image file.");
}

#[tokio::test]
async fn storage_failure_fails_the_upload() {
    let app = common::spawn_app().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "bucket offline"})))
        .mount(&app.storage)
        .await;

    let response = app.upload_photo(300, 200).await;
    assert_eq!(response.status().as_u16(), 502);

    let workflow = app.workflow().await;
    assert_eq!(workflow["step"], "upload");
    assert_eq!(workflow["notice"]["title"], "Upload failed");
}

#[tokio::test]
async fn reading_is_generated_and_shown() {
    let app = common::spawn_app().await;
    accept_storage_writes(&app).await;
    let answer = format!("```json\n{}\n```", common::analysis_json());
    answer_analysis(&app, &answer).await;

    app.upload_photo(1200, 1600).await;
    let response = app
        .post("/reading")
        .json(&json!({"handPreference": "right", "dateOfBirth": "1990-04-12", "gender": ""}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 202);

    let workflow = app.wait_for_reading().await;
    assert_eq!(workflow["step"], "reading");
    assert_eq!(workflow["progress"]["percent"], 100.0);
    assert_eq!(workflow["progress"]["stage"], "done");
    assert_eq!(workflow["notice"]["title"], "Reading Generated!");

    let readings = app.store.readings().await;
    assert_eq!(readings.len(), 1);
    assert!(readings[0]
        .palm_image_url
        .as_deref()
        .unwrap()
        .starts_with("user-1/"));

    let latest: Value = app
        .get("/reading/latest")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(latest["item"]["analysis_data"]["career"]["score"], 84);

    let report = app.get("/reading/latest/report/2").send().await.unwrap();
    assert_eq!(report.status().as_u16(), 200);
    let report: Value = report.json().await.unwrap();
    assert_eq!(report["item"]["title"], "Detailed Analysis");
    assert_eq!(report["item"]["content"]["kind"], "detailed_analysis");

    let missing = app.get("/reading/latest/report/4").send().await.unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn rejected_photo_returns_to_upload() {
    let app = common::spawn_app().await;
    accept_storage_writes(&app).await;
    answer_analysis(&app, r#"{"error": "blurry"}"#).await;

    app.upload_photo(640, 480).await;
    let response = app
        .post("/reading")
        .json(&json!({"handPreference": "left"}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 202);

    let workflow = app.wait_for_reading().await;
    assert_eq!(workflow["step"], "upload");
    assert_eq!(workflow["progress"]["percent"], 0.0);
    assert_eq!(workflow["notice"]["title"], "Image Issue");
    assert_eq!(workflow["notice"]["message"], "blurry");
    assert!(workflow.get("preview").is_none());
    assert!(app.store.readings().await.is_empty());
}

#[tokio::test]
async fn provider_failure_is_surfaced() {
    let app = common::spawn_app().await;
    accept_storage_writes(&app).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&app.openai)
        .await;

    app.upload_photo(640, 480).await;
    app.post("/reading")
        .json(&json!({"handPreference": "both"}))
        .send()
        .await
        .expect("Failed to execute request.");

    let workflow = app.wait_for_reading().await;
    assert_eq!(workflow["step"], "upload");
    assert_eq!(workflow["notice"]["title"], "Error");
    assert!(workflow["notice"]["message"]
        .as_str()
        .unwrap()
        .contains("quota"));
}

#[tokio::test]
async fn upload_during_a_run_is_refused_before_storage() {
    let app = common::spawn_app().await;
    accept_storage_writes(&app).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            common::completion(&common::analysis_json().to_string())
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&app.openai)
        .await;

    app.upload_photo(640, 480).await;
    let response = app
        .post("/reading")
        .json(&json!({"handPreference": "right"}))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 202);

    let pdf = app
        .post("/upload")
        .header("Content-Type", "application/pdf")
        .body(b"%PDF-1.4".to_vec())
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(pdf.status().as_u16(), 400);
    let body: Value = pdf.json().await.unwrap();
    assert_eq!(body["message"], "Please select an image file.");

    let photo = app.upload_photo(640, 480).await;
    assert_eq!(photo.status().as_u16(), 409);
    assert_eq!(app.workflow().await["step"], "progress");

    let workflow = app.wait_for_reading().await;
    assert_eq!(workflow["step"], "reading");
    assert_eq!(app.store.readings().await.len(), 1);
}

#[tokio::test]
async fn reading_needs_a_staged_photo() {
    let app = common::spawn_app().await;

    let response = app
        .post("/reading")
        .json(&json!({"handPreference": "right"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn invalid_profile_is_a_form_error() {
    let app = common::spawn_app().await;
    accept_storage_writes(&app).await;
    app.upload_photo(320, 240).await;

    let response = app
        .post("/reading")
        .json(&json!({"handPreference": "middle"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 422);
    assert_eq!(app.workflow().await["step"], "profile");
}

#[tokio::test]
async fn sign_out_discards_the_workflow() {
    let app = common::spawn_app().await;
    accept_storage_writes(&app).await;
    app.upload_photo(320, 240).await;
    assert_eq!(app.workflow().await["step"], "profile");

    let response = app.delete("/workflow").send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(app.workflow().await["step"], "welcome");
}
