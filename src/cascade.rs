use std::collections::HashSet;
use uuid::Uuid;

use crate::campaign_monitor::CampaignMonitorClient;
use crate::domain::{CampaignList, Client, EmailAddress, ExternalId, Subscriber};
use crate::error::CampaignError;
use crate::store::CampaignStore;

/// `email` has to leave the provider list `list_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRemoval {
    pub list_id: ExternalId,
    pub email: EmailAddress,
}

/// Remote removals run before any local row is deleted.
#[derive(Debug, Default)]
pub struct DeletionPlan {
    pub removals: Vec<RemoteRemoval>,
    pub subscribers: Vec<Uuid>,
    pub lists: Vec<Uuid>,
    pub client: Option<Uuid>,
}

impl DeletionPlan {
    /// A subscriber leaves every list it belongs to, then its row goes.
    pub async fn for_subscriber(
        store: &dyn CampaignStore,
        subscriber: &Subscriber,
    ) -> Result<DeletionPlan, CampaignError> {
        let mut plan = DeletionPlan::default();
        plan.add_subscriber(store, subscriber).await?;

        Ok(plan)
    }

    /// Members leave this list remotely. Their rows are kept, even when this
    /// was their last list.
    pub async fn for_list(
        store: &dyn CampaignStore,
        list: &CampaignList,
    ) -> Result<DeletionPlan, CampaignError> {
        let mut plan = DeletionPlan::default();

        for subscriber in store.subscribers_of_list(list.id).await? {
            plan.removals.push(RemoteRemoval {
                list_id: list.external_id.clone(),
                email: subscriber.email,
            });
        }
        plan.lists.push(list.id);

        Ok(plan)
    }

    /// Every member of the list is deleted outright; the list stays.
    pub async fn for_list_purge(
        store: &dyn CampaignStore,
        list: &CampaignList,
    ) -> Result<DeletionPlan, CampaignError> {
        let mut plan = DeletionPlan::default();

        for subscriber in store.subscribers_of_list(list.id).await? {
            plan.add_subscriber(store, &subscriber).await?;
        }

        Ok(plan)
    }

    /// Every subscriber of every owned list is deleted, then the lists and
    /// the client itself.
    pub async fn for_client(
        store: &dyn CampaignStore,
        client: &Client,
    ) -> Result<DeletionPlan, CampaignError> {
        let mut plan = DeletionPlan::default();
        let mut seen = HashSet::new();

        for list in store.lists_of_client(client.id).await? {
            for subscriber in store.subscribers_of_list(list.id).await? {
                if seen.insert(subscriber.id) {
                    plan.add_subscriber(store, &subscriber).await?;
                }
            }
            plan.lists.push(list.id);
        }
        plan.client = Some(client.id);

        Ok(plan)
    }

    async fn add_subscriber(
        &mut self,
        store: &dyn CampaignStore,
        subscriber: &Subscriber,
    ) -> Result<(), CampaignError> {
        for list in store.lists_of_subscriber(subscriber.id).await? {
            self.removals.push(RemoteRemoval {
                list_id: list.external_id,
                email: subscriber.email.clone(),
            });
        }
        self.subscribers.push(subscriber.id);

        Ok(())
    }

    #[tracing::instrument(name = "Executing a deletion plan", skip_all)]
    pub async fn execute(
        self,
        store: &dyn CampaignStore,
        gateway: &CampaignMonitorClient,
    ) -> Result<(), CampaignError> {
        tracing::info!(
            "Removing {} memberships upstream before deleting {} subscribers and {} lists",
            self.removals.len(),
            self.subscribers.len(),
            self.lists.len()
        );

        for removal in &self.removals {
            if let Err(err) = gateway
                .remove_subscriber(&removal.list_id, &removal.email)
                .await
            {
                tracing::error!(
                    "Failed to remove {} from list {}: {:?}",
                    removal.email,
                    removal.list_id,
                    err
                );
                return Err(err.into());
            }
        }

        for subscriber_id in self.subscribers {
            store.delete_subscriber_row(subscriber_id).await?;
        }
        for list_id in self.lists {
            store.delete_list_row(list_id).await?;
        }
        if let Some(client_id) = self.client {
            store.delete_client_row(client_id).await?;
        }

        Ok(())
    }
}

#[tracing::instrument(name = "Deleting a client", skip(store, gateway, client), fields(client = %client))]
pub async fn delete_client(
    store: &dyn CampaignStore,
    gateway: &CampaignMonitorClient,
    client: &Client,
) -> Result<(), CampaignError> {
    DeletionPlan::for_client(store, client)
        .await?
        .execute(store, gateway)
        .await
}

#[tracing::instrument(name = "Deleting a list", skip(store, gateway, list), fields(list = %list))]
pub async fn delete_list(
    store: &dyn CampaignStore,
    gateway: &CampaignMonitorClient,
    list: &CampaignList,
) -> Result<(), CampaignError> {
    DeletionPlan::for_list(store, list)
        .await?
        .execute(store, gateway)
        .await
}

#[tracing::instrument(name = "Purging the subscribers of a list", skip(store, gateway, list), fields(list = %list))]
pub async fn purge_list(
    store: &dyn CampaignStore,
    gateway: &CampaignMonitorClient,
    list: &CampaignList,
) -> Result<(), CampaignError> {
    DeletionPlan::for_list_purge(store, list)
        .await?
        .execute(store, gateway)
        .await
}

#[tracing::instrument(
    name = "Deleting a subscriber",
    skip(store, gateway),
    fields(subscriber_email = %subscriber.email)
)]
pub async fn delete_subscriber(
    store: &dyn CampaignStore,
    gateway: &CampaignMonitorClient,
    subscriber: &Subscriber,
) -> Result<(), CampaignError> {
    DeletionPlan::for_subscriber(store, subscriber)
        .await?
        .execute(store, gateway)
        .await
}
