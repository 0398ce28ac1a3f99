use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::{
    CampaignList, Client, EmailAddress, ExternalId, NewCampaignList, NewClient, NewSubscriber,
    Subscriber,
};
use crate::store::{CampaignStore, StoreError};

/// Test double for [`crate::store::PgCampaignStore`] enforcing the same
/// constraints as the Postgres schema. Data lives only as long as the process,
/// so it backs tests through `Application::build_with_store`, never production.
#[derive(Default)]
pub struct InMemoryCampaignStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    clients: Vec<Client>,
    lists: Vec<CampaignList>,
    subscribers: Vec<Subscriber>,
    // (subscriber_id, list_id)
    memberships: BTreeSet<(Uuid, Uuid)>,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Inspection helpers for assertions in tests.
    pub fn clients(&self) -> Vec<Client> {
        self.tables().clients.clone()
    }

    pub fn lists(&self) -> Vec<CampaignList> {
        self.tables().lists.clone()
    }

    pub fn subscribers(&self) -> Vec<Subscriber> {
        self.tables().subscribers.clone()
    }

    pub fn membership_count(&self) -> usize {
        self.tables().memberships.len()
    }
}

impl Tables {
    fn lists_of_subscriber(&self, subscriber_id: Uuid) -> Vec<CampaignList> {
        self.lists
            .iter()
            .filter(|list| self.memberships.contains(&(subscriber_id, list.id)))
            .cloned()
            .collect()
    }

    fn remove_list(&mut self, list_id: Uuid) {
        self.lists.retain(|list| list.id != list_id);
        self.memberships.retain(|(_, member_of)| *member_of != list_id);
    }
}

#[async_trait]
impl CampaignStore for InMemoryCampaignStore {
    async fn insert_client(&self, client: &NewClient) -> Result<Client, StoreError> {
        let mut tables = self.tables();

        if tables
            .clients
            .iter()
            .any(|existing| existing.external_id == client.external_id)
        {
            return Err(StoreError::Conflict(format!(
                "A client with external ID {} already exists",
                client.external_id
            )));
        }

        let client = Client {
            id: Uuid::new_v4(),
            external_id: client.external_id.clone(),
            name: client.name.clone(),
            email: client.email.clone(),
            company: client.company.clone(),
            country: client.country.clone(),
            synced_at: Utc::now(),
        };
        tables.clients.push(client.clone());

        Ok(client)
    }

    async fn find_client_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Client>, StoreError> {
        Ok(self
            .tables()
            .clients
            .iter()
            .find(|client| &client.external_id == external_id)
            .cloned())
    }

    async fn delete_client_row(&self, client_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables();
        let owned: Vec<Uuid> = tables
            .lists
            .iter()
            .filter(|list| list.client_id == client_id)
            .map(|list| list.id)
            .collect();

        for list_id in owned {
            tables.remove_list(list_id);
        }
        tables.clients.retain(|client| client.id != client_id);

        Ok(())
    }

    async fn insert_list(&self, list: &NewCampaignList) -> Result<CampaignList, StoreError> {
        let list = CampaignList {
            id: Uuid::new_v4(),
            client_id: list.client_id,
            external_id: list.external_id.clone(),
            name: list.name.clone(),
        };
        self.tables().lists.push(list.clone());

        Ok(list)
    }

    async fn find_list(&self, list_id: Uuid) -> Result<Option<CampaignList>, StoreError> {
        Ok(self
            .tables()
            .lists
            .iter()
            .find(|list| list.id == list_id)
            .cloned())
    }

    async fn lists_of_client(&self, client_id: Uuid) -> Result<Vec<CampaignList>, StoreError> {
        Ok(self
            .tables()
            .lists
            .iter()
            .filter(|list| list.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn delete_list_row(&self, list_id: Uuid) -> Result<(), StoreError> {
        self.tables().remove_list(list_id);

        Ok(())
    }

    async fn insert_subscriber(
        &self,
        subscriber: &NewSubscriber,
        list_ids: &[Uuid],
    ) -> Result<Subscriber, StoreError> {
        let mut tables = self.tables();

        if tables
            .subscribers
            .iter()
            .any(|existing| existing.email == subscriber.email)
        {
            return Err(StoreError::Conflict(format!(
                "A subscriber with email {} already exists",
                subscriber.email
            )));
        }

        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            email: subscriber.email.clone(),
            name: subscriber.name.clone(),
            state: subscriber.state,
        };
        tables.subscribers.push(subscriber.clone());
        for list_id in list_ids {
            tables.memberships.insert((subscriber.id, *list_id));
        }

        Ok(subscriber)
    }

    async fn update_subscriber(&self, subscriber: &Subscriber) -> Result<(), StoreError> {
        let mut tables = self.tables();

        if let Some(existing) = tables
            .subscribers
            .iter_mut()
            .find(|existing| existing.id == subscriber.id)
        {
            existing.name = subscriber.name.clone();
            existing.state = subscriber.state;
        }

        Ok(())
    }

    async fn find_subscriber(&self, subscriber_id: Uuid) -> Result<Option<Subscriber>, StoreError> {
        Ok(self
            .tables()
            .subscribers
            .iter()
            .find(|subscriber| subscriber.id == subscriber_id)
            .cloned())
    }

    async fn find_subscriber_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscriber>, StoreError> {
        Ok(self
            .tables()
            .subscribers
            .iter()
            .find(|subscriber| &subscriber.email == email)
            .cloned())
    }

    async fn subscribers_of_list(&self, list_id: Uuid) -> Result<Vec<Subscriber>, StoreError> {
        let tables = self.tables();
        let mut subscribers: Vec<Subscriber> = tables
            .subscribers
            .iter()
            .filter(|subscriber| tables.memberships.contains(&(subscriber.id, list_id)))
            .cloned()
            .collect();
        subscribers.sort_by(|a, b| a.email.as_ref().cmp(b.email.as_ref()));

        Ok(subscribers)
    }

    async fn lists_of_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<CampaignList>, StoreError> {
        Ok(self.tables().lists_of_subscriber(subscriber_id))
    }

    async fn delete_subscriber_row(&self, subscriber_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables();

        tables
            .subscribers
            .retain(|subscriber| subscriber.id != subscriber_id);
        tables
            .memberships
            .retain(|(member, _)| *member != subscriber_id);

        Ok(())
    }

    async fn add_membership(&self, subscriber_id: Uuid, list_id: Uuid) -> Result<(), StoreError> {
        self.tables().memberships.insert((subscriber_id, list_id));

        Ok(())
    }

    async fn remove_membership(
        &self,
        subscriber_id: Uuid,
        list_id: Uuid,
    ) -> Result<(), StoreError> {
        self.tables().memberships.remove(&(subscriber_id, list_id));

        Ok(())
    }
}
