#![allow(dead_code)]

use palmreader::configuration::{get_configuration, Settings};
use palmreader::db::MemoryStore;
use serde_json::json;
use std::io::Cursor;
use std::net::TcpListener;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const USER_ID: &str = "user-1";

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    /// Object storage; tests mount their own expectations
    pub storage: MockServer,
    /// Inference provider at /v1/chat/completions
    pub openai: MockServer,
    pub auth: MockServer,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.address, route)
    }

    pub fn get(&self, route: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(route)).bearer_auth(TOKEN)
    }

    pub fn post(&self, route: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(route)).bearer_auth(TOKEN)
    }

    pub fn delete(&self, route: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(route)).bearer_auth(TOKEN)
    }

    pub async fn workflow(&self) -> serde_json::Value {
        self.get("/workflow")
            .send()
            .await
            .expect("Failed to execute request.")
            .json::<serde_json::Value>()
            .await
            .expect("Workflow body is not JSON")["item"]
            .clone()
    }

    /// Poll the workflow until it leaves the progress step.
    pub async fn wait_for_reading(&self) -> serde_json::Value {
        for _ in 0..200 {
            let workflow = self.workflow().await;
            if workflow["step"] != "progress" {
                return workflow;
            }
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        }
        panic!("reading did not finish");
    }

    /// Upload a generated photo with storage accepting the write.
    pub async fn upload_photo(&self, width: u32, height: u32) -> reqwest::Response {
        self.post("/upload")
            .header("Content-Type", "image/jpeg")
            .header("X-File-Name", "palm.jpg")
            .body(jpeg(width, height))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

fn test_configuration() -> Settings {
    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.progress.tick_ms = 1;
    configuration.progress.upload_pacing_ms = 5;
    configuration.progress.analyze_pacing_ms = 5;
    configuration.progress.saving_pacing_ms = 5;
    configuration.progress.finalize_pacing_ms = 5;
    configuration.progress.settle_ms = 1;
    configuration.connectors.analysis_service.enabled = false;
    configuration.connectors.analysis_service.api_key = None;
    configuration.connectors.chat_service.enabled = false;
    configuration.connectors.chat_service.api_key = None;
    configuration
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_configuration(test_configuration()).await
}

pub async fn spawn_app_with_configuration(mut configuration: Settings) -> TestApp {
    let auth = MockServer::start().await;
    let storage = MockServer::start().await;
    let openai = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": USER_ID,
            "email": "palm@example.com",
            "email_confirmed_at": "2024-05-01T10:00:00Z",
            "role": "authenticated"
        })))
        .mount(&auth)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&auth)
        .await;

    configuration.auth_url = format!("{}/auth/v1/user", auth.uri());
    configuration.connectors.storage_service.base_url = storage.uri();
    configuration.connectors.openai.endpoint = format!("{}/v1/chat/completions", openai.uri());
    configuration.connectors.openai.api_key = Some("sk-test".to_string());

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let store = Arc::new(MemoryStore::new());

    let server = palmreader::startup::run(listener, store.clone(), configuration)
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        storage,
        openai,
        auth,
        client: reqwest::Client::new(),
    }
}

/// OpenAI-style completion whose first choice says `content`.
pub fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    }))
}

pub fn analysis_json() -> serde_json::Value {
    let domain = |score: u8| {
        json!({
            "score": score,
            "description": "A clear, well formed line",
            "keywords": ["steady", "driven"]
        })
    };
    let line = || {
        json!({
            "description": "Deep and unbroken",
            "characteristics": ["long", "curved"]
        })
    };

    json!({
        "lifePath": domain(78),
        "career": domain(84),
        "relationships": domain(66),
        "health": domain(71),
        "spiritual": domain(59),
        "palmLines": {
            "heartLine": line(),
            "headLine": line(),
            "lifeLine": line(),
            "fateLine": line(),
            "additionalFeatures": line()
        }
    })
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([180, 140, 120]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Jpeg)
        .expect("Failed to encode fixture");
    bytes.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([20, 90, 200]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("Failed to encode fixture");
    bytes.into_inner()
}
