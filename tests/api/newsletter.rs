use serde_json::{json, Value};
use uuid::Uuid;

use crate::helper::spawn_app;

fn newsletter_body(name: &str, category: &str) -> Value {
    json!({
        "name": name,
        "category": category,
        "subject": "Subject",
        "content": "Hello {email}",
        "attachments": [{"name": "a.txt", "data": "aGVsbG8=", "type": "text/plain"}],
    })
}

#[tokio::test]
async fn create_returns_201_with_the_new_id() {
    let app = spawn_app().await;

    let response = app.post_newsletter(newsletter_body("Weekly", "tech")).await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let id = body["id"].as_str().unwrap();
    assert!(Uuid::parse_str(id).is_ok());

    let stored: Value = app.get_newsletter(id).await.json().await.unwrap();
    assert_eq!(stored["category"], "tech");
    assert_eq!(stored["attachments"][0]["type"], "text/plain");
}

#[tokio::test]
async fn create_requires_a_category() {
    let app = spawn_app().await;
    let test_cases = [
        (json!({"name": "Weekly", "subject": "S", "content": "C"}), "missing category"),
        (newsletter_body("Weekly", ""), "empty category"),
        (newsletter_body("Weekly", "   "), "blank category"),
    ];

    for (body, description) in test_cases {
        let response = app.post_newsletter(body).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request for a {}.",
            description
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Category is required");
    }
}

#[tokio::test]
async fn create_requires_a_name() {
    let app = spawn_app().await;

    let response = app.post_newsletter(newsletter_body("", "tech")).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn a_category_holds_a_single_newsletter() {
    let app = spawn_app().await;
    app.post_newsletter(newsletter_body("Weekly", "tech")).await;

    let response = app.post_newsletter(newsletter_body("Daily", "tech")).await;

    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn get_rejects_malformed_ids_and_reports_unknown_ones() {
    let app = spawn_app().await;

    assert_eq!(400, app.get_newsletter("not-a-uuid").await.status().as_u16());
    assert_eq!(
        404,
        app.get_newsletter(&Uuid::new_v4().to_string())
            .await
            .status()
            .as_u16()
    );
}

#[tokio::test]
async fn list_searches_names_case_insensitively() {
    let app = spawn_app().await;
    app.post_newsletter(newsletter_body("Rust Weekly", "rust")).await;
    app.post_newsletter(newsletter_body("Go Weekly", "go")).await;

    let found: Vec<Value> = app.get_newsletters("name=rust").await.json().await.unwrap();
    let all: Vec<Value> = app.get_newsletters("").await.json().await.unwrap();
    let clamped: Vec<Value> = app
        .get_newsletters("page=0&pageSize=0")
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "Rust Weekly");
    assert_eq!(all.len(), 2);
    assert_eq!(clamped.len(), 1);
}

#[tokio::test]
async fn update_overwrites_fields_and_clears_missing_attachments() {
    let app = spawn_app().await;
    let id = app.create_newsletter("tech", "old", json!([])).await;
    app.put_newsletter(json!({
        "id": id,
        "name": "Weekly",
        "category": "tech",
        "subject": "S",
        "content": "old",
        "attachments": [{"name": "a.txt", "data": "aGVsbG8=", "type": "text/plain"}],
    }))
    .await;

    let response = app
        .put_newsletter(json!({
            "id": id,
            "name": "Renamed",
            "category": "science",
            "subject": "New subject",
            "content": "new",
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let stored: Value = app.get_newsletter(&id).await.json().await.unwrap();
    assert_eq!(stored["name"], "Renamed");
    assert_eq!(stored["category"], "science");
    assert_eq!(stored["content"], "new");
    assert_eq!(stored["attachments"], json!([]));
}

#[tokio::test]
async fn update_of_an_unknown_newsletter_is_not_found() {
    let app = spawn_app().await;
    let mut body = newsletter_body("Weekly", "tech");
    body["id"] = json!(Uuid::new_v4());

    let response = app.put_newsletter(body).await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn delete_removes_the_newsletter() {
    let app = spawn_app().await;
    let id = app.create_newsletter("tech", "content", json!([])).await;

    assert_eq!(200, app.delete_newsletter(&id).await.status().as_u16());
    assert_eq!(404, app.get_newsletter(&id).await.status().as_u16());
    assert_eq!(404, app.delete_newsletter(&id).await.status().as_u16());
}
