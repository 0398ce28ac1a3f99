use crate::campaign_monitor::CampaignMonitorClient;
use crate::domain::{
    CampaignList, Client, ExternalId, NewCampaignList, NewClient, NewSubscriber, SubscriberState,
};
use crate::error::CampaignError;
use crate::store::CampaignStore;

// A failed pull is not rolled back.
pub struct Synchronizer<'a> {
    store: &'a dyn CampaignStore,
    gateway: &'a CampaignMonitorClient,
    states: &'a [SubscriberState],
}

impl<'a> Synchronizer<'a> {
    /// `states` selects which subscriber states are pulled for every list.
    pub fn new(
        store: &'a dyn CampaignStore,
        gateway: &'a CampaignMonitorClient,
        states: &'a [SubscriberState],
    ) -> Self {
        Self {
            store,
            gateway,
            states,
        }
    }

    /// Returns the local client, pulling it from Campaign Monitor on a miss.
    ///
    /// A failed pull is reported as the client not being found.
    #[tracing::instrument(name = "Looking up a client", skip(self))]
    pub async fn lookup_or_sync_client(
        &self,
        client_id: &ExternalId,
    ) -> Result<Client, CampaignError> {
        if let Some(client) = self.store.find_client_by_external_id(client_id).await? {
            return Ok(client);
        }

        tracing::warn!("Pulling new client ({}) details", client_id);

        self.sync_client(client_id).await.map_err(|err| {
            tracing::error!("Failed to sync client details: {:?}", err);
            CampaignError::NotFound(format!("Client {} not found", client_id))
        })
    }

    #[tracing::instrument(name = "Syncing a client from Campaign Monitor", skip(self))]
    pub async fn sync_client(&self, client_id: &ExternalId) -> Result<Client, CampaignError> {
        let details = self.gateway.get_client_details(client_id).await?;
        let new_client = NewClient::try_from(details).map_err(CampaignError::Validation)?;
        let client = self.store.insert_client(&new_client).await?;

        for descriptor in self.gateway.get_client_lists(&client.external_id).await? {
            let new_list =
                NewCampaignList::parse(client.id, descriptor).map_err(CampaignError::Validation)?;
            let list = self.store.insert_list(&new_list).await?;

            self.sync_list_subscribers(&list).await?;
        }

        Ok(client)
    }

    #[tracing::instrument(name = "Syncing list subscribers", skip(self, list), fields(list = %list))]
    async fn sync_list_subscribers(&self, list: &CampaignList) -> Result<(), CampaignError> {
        let mut feed = self.gateway.list_subscribers(&list.external_id, self.states);
        let mut synced = 0;

        while let Some(descriptor) = feed.next().await? {
            let new_subscriber =
                NewSubscriber::try_from(descriptor).map_err(CampaignError::Validation)?;

            match self
                .store
                .find_subscriber_by_email(&new_subscriber.email)
                .await?
            {
                Some(mut existing) => {
                    existing.name = new_subscriber.name;
                    existing.state = new_subscriber.state;
                    self.store.add_membership(existing.id, list.id).await?;
                    self.store.update_subscriber(&existing).await?;
                }
                None => {
                    self.store
                        .insert_subscriber(&new_subscriber, &[list.id])
                        .await?;
                }
            }
            synced += 1;
        }

        tracing::info!("Synced {} subscribers", synced);

        Ok(())
    }
}
