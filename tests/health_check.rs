mod common;

#[tokio::test]
async fn health_check_works() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .get(app.url("/health_check"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn workflow_requires_a_user() {
    let app = common::spawn_app().await;

    let anonymous = app
        .client
        .get(app.url("/workflow"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(anonymous.status().as_u16(), 401);

    let bad_token = app
        .client
        .get(app.url("/workflow"))
        .bearer_auth("expired")
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(bad_token.status().as_u16(), 401);
}

#[tokio::test]
async fn new_workflow_starts_at_welcome() {
    let app = common::spawn_app().await;

    let workflow = app.workflow().await;
    assert_eq!(workflow["step"], "welcome");
    assert_eq!(workflow["progress"]["percent"], 0.0);
}
