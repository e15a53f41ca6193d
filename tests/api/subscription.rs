use serde_json::Value;

use crate::helper::{random_email, spawn_app};

#[tokio::test]
async fn subscribe_returns_200_and_the_stored_subscriber() {
    let app = spawn_app().await;
    let email = random_email();

    let response = app.subscribe(&email, "tech").await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["subscriber"]["email"], email.as_str());
    assert_eq!(body["subscriber"]["category"], "tech");
    assert!(body["subscriber"]["subscription_date"].is_string());
}

#[tokio::test]
async fn subscribe_returns_a_400_for_an_invalid_email() {
    let app = spawn_app().await;
    let test_cases = [
        ("definitely-not-an-email", "missing @"),
        ("@domain.com", "missing local part"),
        ("ursula%20le%20guin@", "missing domain"),
    ];

    for (email, description) in test_cases {
        let response = app.subscribe(email, "tech").await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not return a 400 Bad Request when the email was {}.",
            description
        );
    }
}

#[tokio::test]
async fn subscribing_twice_to_the_same_category_is_a_conflict() {
    let app = spawn_app().await;
    let email = random_email();

    assert_eq!(200, app.subscribe(&email, "tech").await.status().as_u16());
    let response = app.subscribe(&email, "tech").await;

    assert_eq!(409, response.status().as_u16());
    let listed: Vec<Value> = app
        .get_subscribers(&format!("email={}", email))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn the_same_email_may_subscribe_to_several_categories() {
    let app = spawn_app().await;
    let email = random_email();

    assert_eq!(200, app.subscribe(&email, "tech").await.status().as_u16());
    assert_eq!(200, app.subscribe(&email, "sports").await.status().as_u16());
}

#[tokio::test]
async fn get_subscriber_returns_404_when_missing() {
    let app = spawn_app().await;

    let response = app.get_subscriber(&random_email(), "tech").await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn get_subscriber_returns_the_subscription() {
    let app = spawn_app().await;
    let email = random_email();
    app.subscribe(&email, "tech").await;

    let response = app.get_subscriber(&email, "tech").await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], email.as_str());
}

#[tokio::test]
async fn unsubscribing_from_one_category_keeps_the_others() {
    let app = spawn_app().await;
    let email = random_email();
    app.subscribe(&email, "tech").await;
    app.subscribe(&email, "sports").await;

    let response = app.unsubscribe(&format!("{}/tech", email)).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["removed"], 1);
    assert_eq!(404, app.get_subscriber(&email, "tech").await.status().as_u16());
    assert_eq!(200, app.get_subscriber(&email, "sports").await.status().as_u16());
}

#[tokio::test]
async fn unsubscribing_without_a_category_removes_every_subscription() {
    let app = spawn_app().await;
    let email = random_email();
    app.subscribe(&email, "tech").await;
    app.subscribe(&email, "sports").await;

    let response = app.unsubscribe(&email).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["removed"], 2);
}

#[tokio::test]
async fn subscribers_can_be_filtered_and_paged() {
    let app = spawn_app().await;
    for _ in 0..3 {
        app.subscribe(&random_email(), "tech").await;
    }
    app.subscribe(&random_email(), "sports").await;

    let tech: Vec<Value> = app
        .get_subscribers("category=tech")
        .await
        .json()
        .await
        .unwrap();
    let second_page: Vec<Value> = app
        .get_subscribers("category=tech&page=2&pageSize=2")
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(tech.len(), 3);
    assert_eq!(second_page.len(), 1);
}

#[tokio::test]
async fn padded_categories_address_the_same_subscription_on_every_route() {
    let app = spawn_app().await;
    let email = random_email();

    assert_eq!(200, app.subscribe(&email, "%20tech%20").await.status().as_u16());

    let found = app.get_subscriber(&email, "%20tech%20").await;
    assert_eq!(200, found.status().as_u16());
    let found: Value = found.json().await.unwrap();
    assert_eq!(found["category"], "tech");

    let response = app.unsubscribe(&format!("{}/%20tech%20", email)).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["removed"], 1);
    assert_eq!(404, app.get_subscriber(&email, "tech").await.status().as_u16());
}

#[tokio::test]
async fn lookup_and_unsubscribe_reject_invalid_emails() {
    let app = spawn_app().await;

    let lookup = app.get_subscriber("definitely-not-an-email", "tech").await;
    let from_category = app.unsubscribe("definitely-not-an-email/tech").await;
    let from_all = app.unsubscribe("definitely-not-an-email").await;

    assert_eq!(400, lookup.status().as_u16());
    assert_eq!(400, from_category.status().as_u16());
    assert_eq!(400, from_all.status().as_u16());
}
