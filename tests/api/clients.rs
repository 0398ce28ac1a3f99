use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{mount_remote_client, TestApp, CLIENT_ID, LIST_ID};

#[tokio::test]
async fn unknown_client_is_pulled_from_campaign_monitor() {
    let test_app = TestApp::spawn_app().await;
    mount_remote_client(&test_app.campaign_monitor, 1).await;

    let response = test_app.get_client(CLIENT_ID).await;

    assert_eq!(200, response.status().as_u16());
    let overview: serde_json::Value = response.json().await.unwrap();
    assert_eq!(overview["client"]["external_id"], CLIENT_ID);
    assert_eq!(overview["lists"][0]["list"]["external_id"], LIST_ID);
    assert_eq!(overview["lists"][0]["subscriber_count"], 2);
    assert_eq!(overview["lists"][0]["active_count"], 1);
    assert_eq!(test_app.store.subscribers().len(), 2);
}

#[tokio::test]
async fn second_lookup_does_not_reach_campaign_monitor() {
    let test_app = TestApp::spawn_app().await;
    // Every remote endpoint may only be hit once.
    mount_remote_client(&test_app.campaign_monitor, 1).await;

    let first = test_app.get_client(CLIENT_ID).await;
    let second = test_app.get_client(CLIENT_ID).await;

    assert_eq!(200, first.status().as_u16());
    assert_eq!(200, second.status().as_u16());
    assert_eq!(test_app.store.clients().len(), 1);
}

#[tokio::test]
async fn client_missing_upstream_returns_404() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "Code": 102,
            "Message": "Invalid ClientID"
        })))
        .expect(1)
        .mount(&test_app.campaign_monitor)
        .await;

    let response = test_app.get_client(CLIENT_ID).await;

    assert_eq!(404, response.status().as_u16());
    assert!(test_app.store.clients().is_empty());
}

#[tokio::test]
async fn malformed_client_id_returns_404_without_upstream_calls() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.campaign_monitor)
        .await;

    let response = test_app.get_client("tooshort").await;

    assert_eq!(404, response.status().as_u16());
}
