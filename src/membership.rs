use std::collections::HashSet;
use uuid::Uuid;

use crate::campaign_monitor::CampaignMonitorClient;
use crate::domain::{CampaignList, ExternalId, NewSubscriber, Subscriber};
use crate::error::CampaignError;
use crate::store::CampaignStore;

/// Campaign Monitor is updated first; the local association follows on success.
pub struct MembershipCoordinator<'a> {
    store: &'a dyn CampaignStore,
    gateway: &'a CampaignMonitorClient,
}

/// Outcome of removing a subscriber from one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsubscribed {
    /// The subscriber is still a member of other lists.
    Detached,
    /// That was the subscriber's last list, so its row was deleted.
    Deleted,
}

/// Counterparts to attach and detach when moving from one membership set to
/// another. Counterparts present in both sets appear in neither.
#[derive(Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct MembershipDiff {
    pub to_subscribe: HashSet<Uuid>,
    pub to_unsubscribe: HashSet<Uuid>,
}

impl MembershipDiff {
    pub fn between(before: &HashSet<Uuid>, after: &HashSet<Uuid>) -> MembershipDiff {
        MembershipDiff {
            to_subscribe: after.difference(before).copied().collect(),
            to_unsubscribe: before.difference(after).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_subscribe.is_empty() && self.to_unsubscribe.is_empty()
    }
}

impl<'a> MembershipCoordinator<'a> {
    pub fn new(store: &'a dyn CampaignStore, gateway: &'a CampaignMonitorClient) -> Self {
        Self { store, gateway }
    }

    #[tracing::instrument(
        name = "Subscribing to a list",
        skip(self, list, subscriber),
        fields(list = %list, subscriber_email = %subscriber.email)
    )]
    pub async fn subscribe(
        &self,
        list: &CampaignList,
        subscriber: &Subscriber,
    ) -> Result<(), CampaignError> {
        if let Err(err) = self
            .gateway
            .import_subscriber(
                &list.external_id,
                subscriber.name.as_ref(),
                &subscriber.email,
                true,
            )
            .await
        {
            tracing::error!("Failed to import subscriber: {:?}", err);
            return Err(err.into());
        }

        self.store.add_membership(subscriber.id, list.id).await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "Unsubscribing from a list",
        skip(self, list, subscriber),
        fields(list = %list, subscriber_email = %subscriber.email)
    )]
    pub async fn unsubscribe(
        &self,
        list: &CampaignList,
        subscriber: &Subscriber,
    ) -> Result<Unsubscribed, CampaignError> {
        if let Err(err) = self
            .gateway
            .remove_subscriber(&list.external_id, &subscriber.email)
            .await
        {
            tracing::error!("Failed to remove subscriber: {:?}", err);
            return Err(err.into());
        }

        self.store.remove_membership(subscriber.id, list.id).await?;

        // A subscriber without lists is not kept around.
        if self
            .store
            .lists_of_subscriber(subscriber.id)
            .await?
            .is_empty()
        {
            self.store.delete_subscriber_row(subscriber.id).await?;
            return Ok(Unsubscribed::Deleted);
        }

        Ok(Unsubscribed::Detached)
    }

    /// Makes `subscriber_ids` the exact member set of `list`.
    ///
    /// Additions are applied before removals, so each call only touches the
    /// members that actually change.
    #[tracing::instrument(name = "Replacing the subscribers of a list", skip(self, list), fields(list = %list))]
    pub async fn replace_list_subscribers(
        &self,
        list: &CampaignList,
        subscriber_ids: &HashSet<Uuid>,
    ) -> Result<MembershipDiff, CampaignError> {
        let before: HashSet<Uuid> = self
            .store
            .subscribers_of_list(list.id)
            .await?
            .into_iter()
            .map(|subscriber| subscriber.id)
            .collect();
        let diff = MembershipDiff::between(&before, subscriber_ids);

        let mut to_subscribe = Vec::with_capacity(diff.to_subscribe.len());
        for subscriber_id in &diff.to_subscribe {
            to_subscribe.push(self.existing_subscriber(*subscriber_id).await?);
        }

        for subscriber in &to_subscribe {
            self.subscribe(list, subscriber).await?;
        }
        for subscriber_id in &diff.to_unsubscribe {
            let subscriber = self.existing_subscriber(*subscriber_id).await?;
            self.unsubscribe(list, &subscriber).await?;
        }

        Ok(diff)
    }

    /// Makes `list_ids` the exact list set of `subscriber`.
    ///
    /// Emptying the set deletes the subscriber along with its last membership.
    #[tracing::instrument(
        name = "Replacing the lists of a subscriber",
        skip(self, subscriber),
        fields(subscriber_email = %subscriber.email)
    )]
    pub async fn replace_subscriber_lists(
        &self,
        subscriber: &Subscriber,
        list_ids: &HashSet<Uuid>,
    ) -> Result<MembershipDiff, CampaignError> {
        let before: HashSet<Uuid> = self
            .store
            .lists_of_subscriber(subscriber.id)
            .await?
            .into_iter()
            .map(|list| list.id)
            .collect();
        let diff = MembershipDiff::between(&before, list_ids);

        let mut to_subscribe = Vec::with_capacity(diff.to_subscribe.len());
        for list_id in &diff.to_subscribe {
            to_subscribe.push(self.existing_list(*list_id).await?);
        }

        for list in &to_subscribe {
            self.subscribe(list, subscriber).await?;
        }
        for list_id in &diff.to_unsubscribe {
            let list = self.existing_list(*list_id).await?;
            self.unsubscribe(&list, subscriber).await?;
        }

        Ok(diff)
    }

    async fn existing_subscriber(&self, subscriber_id: Uuid) -> Result<Subscriber, CampaignError> {
        self.store
            .find_subscriber(subscriber_id)
            .await?
            .ok_or_else(|| CampaignError::NotFound(format!("Subscriber {} not found", subscriber_id)))
    }

    async fn existing_list(&self, list_id: Uuid) -> Result<CampaignList, CampaignError> {
        self.store
            .find_list(list_id)
            .await?
            .ok_or_else(|| CampaignError::NotFound(format!("List {} not found", list_id)))
    }
}

/// Imports a subscriber into each of the client's lists named by `list_ids`.
///
/// Ownership of every list is checked before Campaign Monitor is contacted. An
/// existing subscriber with the same email is reused and takes the new name.
#[tracing::instrument(
    name = "Adding a subscriber to lists",
    skip(store, gateway, new_subscriber),
    fields(subscriber_email = %new_subscriber.email)
)]
pub async fn add_subscriber_to_lists(
    store: &dyn CampaignStore,
    gateway: &CampaignMonitorClient,
    client_id: &ExternalId,
    new_subscriber: NewSubscriber,
    list_ids: &[Uuid],
) -> Result<Subscriber, CampaignError> {
    if list_ids.is_empty() {
        return Err(CampaignError::Validation(
            "At least one list has to be selected".to_string(),
        ));
    }

    let client = store
        .find_client_by_external_id(client_id)
        .await?
        .ok_or_else(|| CampaignError::NotFound(format!("Client {} not found", client_id)))?;

    let mut lists = Vec::with_capacity(list_ids.len());
    for list_id in list_ids {
        match store.find_list(*list_id).await? {
            Some(list) if list.client_id == client.id => lists.push(list),
            _ => {
                return Err(CampaignError::NotFound(format!(
                    "List {} not found for {}",
                    list_id, client
                )))
            }
        }
    }

    let coordinator = MembershipCoordinator::new(store, gateway);
    let mut subscriber = store.find_subscriber_by_email(&new_subscriber.email).await?;

    for list in &lists {
        match subscriber.as_mut() {
            Some(existing) => {
                let renamed = existing.name != new_subscriber.name;
                existing.name = new_subscriber.name.clone();
                coordinator.subscribe(list, existing).await?;
                if renamed {
                    store.update_subscriber(existing).await?;
                }
            }
            None => {
                if let Err(err) = gateway
                    .import_subscriber(
                        &list.external_id,
                        new_subscriber.name.as_ref(),
                        &new_subscriber.email,
                        true,
                    )
                    .await
                {
                    tracing::error!("Failed to import subscriber: {:?}", err);
                    return Err(err.into());
                }
                subscriber = Some(store.insert_subscriber(&new_subscriber, &[list.id]).await?);
            }
        }
    }

    subscriber.ok_or_else(|| CampaignError::NotFound("Subscriber not found".to_string()))
}

/// Removes a subscriber from one of the client's lists.
///
/// `list_id` is the Campaign Monitor list id. The subscriber must currently
/// belong to that list and the list must be owned by `client_id`, otherwise
/// nothing is found.
#[tracing::instrument(name = "Removing a subscriber from a list", skip(store, gateway))]
pub async fn remove_subscriber_from_list(
    store: &dyn CampaignStore,
    gateway: &CampaignMonitorClient,
    client_id: &ExternalId,
    list_id: &ExternalId,
    subscriber_id: Uuid,
) -> Result<Unsubscribed, CampaignError> {
    let not_found = || {
        CampaignError::NotFound(format!(
            "Subscriber {} not found in list {} of client {}",
            subscriber_id, list_id, client_id
        ))
    };

    let subscriber = store
        .find_subscriber(subscriber_id)
        .await?
        .ok_or_else(not_found)?;
    let client = store
        .find_client_by_external_id(client_id)
        .await?
        .ok_or_else(not_found)?;
    let list = store
        .lists_of_subscriber(subscriber.id)
        .await?
        .into_iter()
        .find(|list| &list.external_id == list_id && list.client_id == client.id)
        .ok_or_else(not_found)?;

    MembershipCoordinator::new(store, gateway)
        .unsubscribe(&list, &subscriber)
        .await
}
