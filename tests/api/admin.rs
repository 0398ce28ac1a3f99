use uuid::Uuid;
use wiremock::matchers::{any, method, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{TestApp, CLIENT_ID, LIST_ID};

const OTHER_LIST_ID: &str = "33333333333333333333333333333333";

#[tokio::test]
async fn deleting_a_client_clears_campaign_monitor_memberships_first() {
    let test_app = TestApp::spawn_app().await;
    let client = test_app.seed_client(CLIENT_ID).await;
    let list = test_app.seed_list(&client, LIST_ID).await;
    let other = test_app.seed_list(&client, OTHER_LIST_ID).await;
    test_app.seed_subscriber("alice@example.com", &[&list]).await;
    test_app.seed_subscriber("bob@example.com", &[&list]).await;
    test_app.seed_subscriber("carol@example.com", &[&other]).await;
    test_app.seed_subscriber("dave@example.com", &[&other]).await;
    test_app.expect_removals(LIST_ID, 2).await;
    test_app.expect_removals(OTHER_LIST_ID, 2).await;

    let response = test_app
        .admin_delete(&format!("clients/{}", CLIENT_ID))
        .await;

    assert_eq!(200, response.status().as_u16());
    assert!(test_app.store.clients().is_empty());
    assert!(test_app.store.lists().is_empty());
    assert!(test_app.store.subscribers().is_empty());
}

#[tokio::test]
async fn deleting_a_list_keeps_subscribers_locally() {
    let test_app = TestApp::spawn_app().await;
    let client = test_app.seed_client(CLIENT_ID).await;
    let list = test_app.seed_list(&client, LIST_ID).await;
    test_app.seed_subscriber("alice@example.com", &[&list]).await;
    test_app.expect_removals(LIST_ID, 1).await;

    let response = test_app.admin_delete(&format!("lists/{}", list.id)).await;

    assert_eq!(200, response.status().as_u16());
    assert!(test_app.store.lists().is_empty());
    assert_eq!(test_app.store.subscribers().len(), 1);
}

#[tokio::test]
async fn deleting_an_unknown_list_returns_404() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.campaign_monitor)
        .await;

    let response = test_app
        .admin_delete(&format!("lists/{}", Uuid::new_v4()))
        .await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn purging_a_list_deletes_its_subscribers_only() {
    let test_app = TestApp::spawn_app().await;
    let client = test_app.seed_client(CLIENT_ID).await;
    let list = test_app.seed_list(&client, LIST_ID).await;
    test_app.seed_subscriber("alice@example.com", &[&list]).await;
    test_app.seed_subscriber("bob@example.com", &[&list]).await;
    test_app.expect_removals(LIST_ID, 2).await;

    let response = test_app.admin_post(&format!("lists/{}/purge", list.id)).await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(test_app.store.lists().len(), 1);
    assert!(test_app.store.subscribers().is_empty());
}

#[tokio::test]
async fn replacing_list_subscribers_syncs_only_the_changes() {
    let test_app = TestApp::spawn_app().await;
    let client = test_app.seed_client(CLIENT_ID).await;
    let list = test_app.seed_list(&client, LIST_ID).await;
    let other = test_app.seed_list(&client, OTHER_LIST_ID).await;
    let kept = test_app.seed_subscriber("kept@example.com", &[&list]).await;
    let dropped = test_app
        .seed_subscriber("dropped@example.com", &[&list, &other])
        .await;
    let added = test_app.seed_subscriber("added@example.com", &[]).await;
    test_app.expect_imports(LIST_ID, 1).await;
    Mock::given(method("DELETE"))
        .and(query_param("email", "dropped@example.com"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test_app.campaign_monitor)
        .await;

    let response = test_app
        .admin_put(
            &format!("lists/{}/subscribers", list.id),
            serde_json::json!({ "subscribers": [kept.id, added.id] }),
        )
        .await;

    assert_eq!(200, response.status().as_u16());
    let diff: serde_json::Value = response.json().await.unwrap();
    assert_eq!(diff["to_subscribe"], serde_json::json!([added.id]));
    assert_eq!(diff["to_unsubscribe"], serde_json::json!([dropped.id]));
}

#[tokio::test]
async fn emptying_the_lists_of_a_subscriber_deletes_it() {
    let test_app = TestApp::spawn_app().await;
    let client = test_app.seed_client(CLIENT_ID).await;
    let list = test_app.seed_list(&client, LIST_ID).await;
    let alice = test_app.seed_subscriber("alice@example.com", &[&list]).await;
    test_app.expect_removals(LIST_ID, 1).await;

    let response = test_app
        .admin_put(
            &format!("subscribers/{}/lists", alice.id),
            serde_json::json!({ "lists": [] }),
        )
        .await;

    assert_eq!(200, response.status().as_u16());
    assert!(test_app.store.subscribers().is_empty());
}

#[tokio::test]
async fn deleting_a_subscriber_leaves_every_list_upstream() {
    let test_app = TestApp::spawn_app().await;
    let client = test_app.seed_client(CLIENT_ID).await;
    let list = test_app.seed_list(&client, LIST_ID).await;
    let other = test_app.seed_list(&client, OTHER_LIST_ID).await;
    let alice = test_app
        .seed_subscriber("alice@example.com", &[&list, &other])
        .await;
    test_app.expect_removals(LIST_ID, 1).await;
    test_app.expect_removals(OTHER_LIST_ID, 1).await;

    let response = test_app
        .admin_delete(&format!("subscribers/{}", alice.id))
        .await;

    assert_eq!(200, response.status().as_u16());
    assert!(test_app.store.subscribers().is_empty());
    assert_eq!(test_app.store.lists().len(), 2);
}
