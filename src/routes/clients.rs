use actix_web::{web, HttpResponse};

use crate::campaign_monitor::CampaignMonitorClient;
use crate::domain::{CampaignList, Client, Subscriber};
use crate::error::CampaignError;
use crate::routes::parse_client_id;
use crate::startup::SyncStatuses;
use crate::store::CampaignStore;
use crate::sync::Synchronizer;

#[derive(serde::Serialize)]
pub struct ClientOverview {
    pub client: Client,
    pub lists: Vec<ListOverview>,
}

#[derive(serde::Serialize)]
pub struct ListOverview {
    pub list: CampaignList,
    pub subscriber_count: usize,
    pub active_count: usize,
    pub subscribers: Vec<Subscriber>,
}

impl ClientOverview {
    pub async fn load(store: &dyn CampaignStore, client: Client) -> Result<Self, CampaignError> {
        let mut lists = Vec::new();

        for list in store.lists_of_client(client.id).await? {
            let subscribers = store.subscribers_of_list(list.id).await?;

            lists.push(ListOverview {
                list,
                subscriber_count: subscribers.len(),
                active_count: subscribers
                    .iter()
                    .filter(|subscriber| subscriber.state.is_active())
                    .count(),
                subscribers,
            });
        }

        Ok(Self { client, lists })
    }
}

/// Serves a client from the local mirror, pulling it from Campaign Monitor the first time.
#[tracing::instrument(name = "Client details handler", skip(store, gateway, sync_statuses))]
pub async fn get_client(
    client_id: web::Path<String>,
    store: web::Data<dyn CampaignStore>,
    gateway: web::Data<CampaignMonitorClient>,
    sync_statuses: web::Data<SyncStatuses>,
) -> Result<HttpResponse, CampaignError> {
    let client_id = parse_client_id(client_id.into_inner())?;
    let client = Synchronizer::new(store.get_ref(), gateway.get_ref(), &sync_statuses.0)
        .lookup_or_sync_client(&client_id)
        .await?;
    let overview = ClientOverview::load(store.get_ref(), client).await?;

    Ok(HttpResponse::Ok().json(overview))
}
