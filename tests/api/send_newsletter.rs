use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::{
    matchers::{body_partial_json, header_exists, method, path},
    Mock, ResponseTemplate,
};

use crate::helper::{spawn_app, TestApp};

async fn accept_all_emails(app: &TestApp, expected: u64) {
    Mock::given(path("/email"))
        .and(method("POST"))
        .and(header_exists("X-Postmark-Server-Token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(expected)
        .mount(&app.email_server)
        .await;
}

#[tokio::test]
async fn every_subscriber_of_the_category_gets_a_personalised_email() {
    let app = spawn_app().await;
    let id = app
        .create_newsletter("tech", "Hello {email}, visit {hostDomain}", json!([]))
        .await;
    app.subscribe("a@example.com", "tech").await;
    app.subscribe("b@example.com", "tech").await;
    app.subscribe("c@example.com", "sports").await;
    accept_all_emails(&app, 2).await;

    let response = app.send_newsletter(&id).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["attempted"], 2);
    assert_eq!(body["delivered"], 2);
    assert_eq!(body["failed"], 0);

    let emails = app.sent_emails().await;
    let mut bodies: Vec<(String, String)> = emails
        .iter()
        .map(|e| {
            (
                e["To"].as_str().unwrap().to_owned(),
                e["HtmlBody"].as_str().unwrap().to_owned(),
            )
        })
        .collect();
    bodies.sort();
    assert_eq!(
        bodies,
        vec![
            (
                "a@example.com".to_owned(),
                "Hello a@example.com|tech, visit http://localhost:4200/".to_owned()
            ),
            (
                "b@example.com".to_owned(),
                "Hello b@example.com|tech, visit http://localhost:4200/".to_owned()
            ),
        ]
    );
    assert!(emails.iter().all(|e| e["Subject"] == "S"));
}

#[tokio::test]
async fn attachments_are_forwarded_to_every_recipient() {
    let app = spawn_app().await;
    let id = app
        .create_newsletter(
            "tech",
            "content",
            json!([
                {"name": "a.txt", "data": "aGVsbG8=", "type": "text/plain"},
                {"name": "b.txt", "data": "d29ybGQ=", "type": "text/plain"},
            ]),
        )
        .await;
    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        app.subscribe(email, "tech").await;
    }
    accept_all_emails(&app, 3).await;

    app.send_newsletter(&id).await;

    for email in app.sent_emails().await {
        assert_eq!(
            email["Attachments"],
            json!([
                {"Name": "a.txt", "Content": "aGVsbG8=", "ContentType": "text/plain"},
                {"Name": "b.txt", "Content": "d29ybGQ=", "ContentType": "text/plain"},
            ])
        );
    }
}

#[tokio::test]
async fn a_rejected_recipient_does_not_stop_the_others() {
    let app = spawn_app().await;
    let id = app.create_newsletter("tech", "content", json!([])).await;
    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        app.subscribe(email, "tech").await;
    }
    Mock::given(path("/email"))
        .and(body_partial_json(json!({"To": "b@example.com"})))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;
    accept_all_emails(&app, 2).await;

    let response = app.send_newsletter(&id).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["attempted"], 3);
    assert_eq!(body["delivered"], 2);
    assert_eq!(body["failed"], 1);
}

#[tokio::test]
async fn a_category_without_subscribers_sends_nothing() {
    let app = spawn_app().await;
    let id = app.create_newsletter("tech", "content", json!([])).await;
    accept_all_emails(&app, 0).await;

    let response = app.send_newsletter(&id).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["attempted"], 0);
}

#[tokio::test]
async fn an_invalid_attachment_is_rejected_before_any_email_is_sent() {
    let app = spawn_app().await;
    let id = app
        .create_newsletter(
            "tech",
            "content",
            json!([{
                "name": "bad.bin",
                "data": "%%%not base64%%%",
                "type": "application/octet-stream",
            }]),
        )
        .await;
    app.subscribe("a@example.com", "tech").await;
    accept_all_emails(&app, 0).await;

    let response = app.send_newsletter(&id).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn empty_content_is_rejected_before_any_email_is_sent() {
    let app = spawn_app().await;
    let id = app.create_newsletter("tech", "", json!([])).await;
    app.subscribe("a@example.com", "tech").await;
    accept_all_emails(&app, 0).await;

    let response = app.send_newsletter(&id).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_rejected() {
    let app = spawn_app().await;
    accept_all_emails(&app, 0).await;

    let unknown = app.send_newsletter(&Uuid::new_v4().to_string()).await;
    let malformed = app.send_newsletter("not-a-uuid").await;

    assert_eq!(404, unknown.status().as_u16());
    assert_eq!(400, malformed.status().as_u16());
}

#[tokio::test]
async fn line_wrapped_attachments_are_sent() {
    let app = spawn_app().await;
    let id = app
        .create_newsletter(
            "tech",
            "content",
            json!([{"name": "a.txt", "data": "aGVs\r\nbG8=\n", "type": "text/plain"}]),
        )
        .await;
    app.subscribe("a@example.com", "tech").await;
    accept_all_emails(&app, 1).await;

    let response = app.send_newsletter(&id).await;

    assert_eq!(200, response.status().as_u16());
    let emails = app.sent_emails().await;
    assert_eq!(emails[0]["Attachments"][0]["Content"], "aGVsbG8=");
}
