use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{TestApp, CLIENT_ID, LIST_ID};

#[tokio::test]
async fn subscribe_returns_201_and_persists_the_subscriber() {
    let test_app = TestApp::spawn_app().await;
    let client = test_app.seed_client(CLIENT_ID).await;
    let list = test_app.seed_list(&client, LIST_ID).await;

    Mock::given(path(format!("/subscribers/{}.json", LIST_ID)))
        .and(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "EmailAddress": "alice@example.com",
            "Name": "Alice"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&test_app.campaign_monitor)
        .await;

    let body = serde_json::json!({
        "name": "Alice",
        "email": "alice@example.com",
        "lists": [list.id]
    });
    let response = test_app.post_subscription(CLIENT_ID, body).await;

    assert_eq!(201, response.status().as_u16());
    let subscribers = test_app.store.subscribers();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].email.as_ref(), "alice@example.com");
    assert_eq!(subscribers[0].name.as_ref(), "Alice");
    assert!(subscribers[0].state.is_active());
    assert_eq!(test_app.store.membership_count(), 1);
}

#[tokio::test]
async fn subscribe_returns_400_when_body_is_present_but_not_valid() {
    let test_app = TestApp::spawn_app().await;
    let client = test_app.seed_client(CLIENT_ID).await;
    let list = test_app.seed_list(&client, LIST_ID).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&test_app.campaign_monitor)
        .await;

    // This is a common practice and it is called table-driven tests. In this case, it simulates different kind of possible request bodies
    // where API should return 400.
    let test_cases = vec![
        (serde_json::json!({}), "missing body parameters"),
        (
            serde_json::json!({ "name": "Alice", "lists": [list.id] }),
            "missing email parameter",
        ),
        (
            serde_json::json!({ "name": "Alice", "email": "alice.com", "lists": [list.id] }),
            "invalid email parameter",
        ),
        (
            serde_json::json!({ "name": " ", "email": "alice@example.com", "lists": [list.id] }),
            "blank name parameter",
        ),
        (
            serde_json::json!({ "name": "Alice", "email": "alice@example.com", "lists": [] }),
            "no list selected",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_subscription(CLIENT_ID, invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
    }
}

#[tokio::test]
async fn subscribe_to_a_foreign_list_returns_404() {
    let test_app = TestApp::spawn_app().await;
    test_app.seed_client(CLIENT_ID).await;
    let other = test_app.seed_client(&"9".repeat(32)).await;
    let foreign = test_app.seed_list(&other, LIST_ID).await;

    let body = serde_json::json!({
        "name": "Alice",
        "email": "alice@example.com",
        "lists": [foreign.id]
    });
    let response = test_app.post_subscription(CLIENT_ID, body).await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn subscribe_fails_with_502_and_stores_nothing_when_campaign_monitor_fails() {
    let test_app = TestApp::spawn_app().await;
    let client = test_app.seed_client(CLIENT_ID).await;
    let list = test_app.seed_list(&client, LIST_ID).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&test_app.campaign_monitor)
        .await;

    let body = serde_json::json!({
        "name": "Alice",
        "email": "alice@example.com",
        "lists": [list.id]
    });
    let response = test_app.post_subscription(CLIENT_ID, body).await;

    assert_eq!(502, response.status().as_u16());
    assert!(test_app.store.subscribers().is_empty());
}

#[tokio::test]
async fn unsubscribing_from_the_last_list_deletes_the_subscriber() {
    let test_app = TestApp::spawn_app().await;
    let client = test_app.seed_client(CLIENT_ID).await;
    let list = test_app.seed_list(&client, LIST_ID).await;
    let alice = test_app.seed_subscriber("alice@example.com", &[&list]).await;
    test_app.expect_removals(LIST_ID, 1).await;

    let response = test_app.post_unsubscribe(CLIENT_ID, LIST_ID, alice.id).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["subscriber_deleted"], true);
    assert!(test_app.store.subscribers().is_empty());
}

#[tokio::test]
async fn unsubscribing_through_another_client_returns_404() {
    let test_app = TestApp::spawn_app().await;
    let client = test_app.seed_client(CLIENT_ID).await;
    let other_client_id = "9".repeat(32);
    test_app.seed_client(&other_client_id).await;
    let list = test_app.seed_list(&client, LIST_ID).await;
    let alice = test_app.seed_subscriber("alice@example.com", &[&list]).await;
    test_app.expect_removals(LIST_ID, 0).await;

    let wrong_client = test_app
        .post_unsubscribe(&other_client_id, LIST_ID, alice.id)
        .await;
    let unknown_list = test_app
        .post_unsubscribe(CLIENT_ID, &"3".repeat(32), alice.id)
        .await;
    let local_list_id = test_app
        .post_unsubscribe(CLIENT_ID, &list.id.to_string(), alice.id)
        .await;

    assert_eq!(404, wrong_client.status().as_u16());
    assert_eq!(404, unknown_list.status().as_u16());
    assert_eq!(404, local_list_id.status().as_u16());
    assert_eq!(test_app.store.membership_count(), 1);
}
