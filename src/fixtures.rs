use secrecy::Secret;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::campaign_monitor::CampaignMonitorClient;
use crate::domain::{
    CampaignList, Client, EmailAddress, ExternalId, Label, NewCampaignList, NewClient,
    NewSubscriber, Subscriber, SubscriberState,
};
use crate::store::{CampaignStore, InMemoryCampaignStore};

pub fn external_id(fill: char) -> ExternalId {
    ExternalId::parse(fill.to_string().repeat(32)).unwrap()
}

pub fn gateway(mock_server: &MockServer) -> CampaignMonitorClient {
    CampaignMonitorClient::new(mock_server.uri(), Secret::new("api-key".to_string()), None)
        .unwrap()
}

pub async fn seed_client(store: &InMemoryCampaignStore, fill: char) -> Client {
    store
        .insert_client(&NewClient {
            external_id: external_id(fill),
            name: Label::parse_blankable("Wile E.".to_string()).unwrap(),
            email: None,
            company: Label::parse("Acme".to_string()).unwrap(),
            country: Label::parse("Greece".to_string()).unwrap(),
        })
        .await
        .unwrap()
}

pub async fn seed_list(store: &InMemoryCampaignStore, client: &Client, fill: char) -> CampaignList {
    store
        .insert_list(&NewCampaignList {
            client_id: client.id,
            external_id: external_id(fill),
            name: Label::parse(format!("List {}", fill)).unwrap(),
        })
        .await
        .unwrap()
}

pub async fn seed_subscriber(
    store: &InMemoryCampaignStore,
    email: &str,
    lists: &[&CampaignList],
) -> Subscriber {
    let list_ids: Vec<_> = lists.iter().map(|list| list.id).collect();

    store
        .insert_subscriber(
            &NewSubscriber {
                email: EmailAddress::parse(email.to_string()).unwrap(),
                name: Label::parse_blankable(String::new()).unwrap(),
                state: SubscriberState::Active,
            },
            &list_ids,
        )
        .await
        .unwrap()
}

/// Accepts any subscriber removal on `list` and expects exactly `times` of them.
pub async fn expect_removals(mock_server: &MockServer, list: &CampaignList, times: u64) {
    Mock::given(method("DELETE"))
        .and(path(format!("/subscribers/{}.json", list.external_id)))
        .respond_with(ResponseTemplate::new(200))
        .expect(times)
        .mount(mock_server)
        .await;
}

pub async fn expect_imports(mock_server: &MockServer, list: &CampaignList, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/subscribers/{}.json", list.external_id)))
        .respond_with(ResponseTemplate::new(201))
        .expect(times)
        .mount(mock_server)
        .await;
}
