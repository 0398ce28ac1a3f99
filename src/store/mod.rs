mod memory;
mod postgres;

pub use memory::InMemoryCampaignStore;
pub use postgres::PgCampaignStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    CampaignList, Client, EmailAddress, ExternalId, NewCampaignList, NewClient, NewSubscriber,
    Subscriber,
};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),
    #[error("Failed to execute a database query.")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_client(&self, client: &NewClient) -> Result<Client, StoreError>;

    async fn find_client_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Client>, StoreError>;

    /// Removes the client row together with its lists and their memberships.
    async fn delete_client_row(&self, client_id: Uuid) -> Result<(), StoreError>;

    async fn insert_list(&self, list: &NewCampaignList) -> Result<CampaignList, StoreError>;

    async fn find_list(&self, list_id: Uuid) -> Result<Option<CampaignList>, StoreError>;

    async fn lists_of_client(&self, client_id: Uuid) -> Result<Vec<CampaignList>, StoreError>;

    /// Removes the list row and its memberships. Subscribers are kept.
    async fn delete_list_row(&self, list_id: Uuid) -> Result<(), StoreError>;

    /// Inserts the subscriber and its initial memberships as a single write.
    async fn insert_subscriber(
        &self,
        subscriber: &NewSubscriber,
        list_ids: &[Uuid],
    ) -> Result<Subscriber, StoreError>;

    /// Saves name and state of an existing subscriber.
    async fn update_subscriber(&self, subscriber: &Subscriber) -> Result<(), StoreError>;

    async fn find_subscriber(&self, subscriber_id: Uuid) -> Result<Option<Subscriber>, StoreError>;

    async fn find_subscriber_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscriber>, StoreError>;

    async fn subscribers_of_list(&self, list_id: Uuid) -> Result<Vec<Subscriber>, StoreError>;

    async fn lists_of_subscriber(&self, subscriber_id: Uuid)
        -> Result<Vec<CampaignList>, StoreError>;

    async fn delete_subscriber_row(&self, subscriber_id: Uuid) -> Result<(), StoreError>;

    /// Attaching an already attached list is a no-op.
    async fn add_membership(&self, subscriber_id: Uuid, list_id: Uuid) -> Result<(), StoreError>;

    async fn remove_membership(&self, subscriber_id: Uuid, list_id: Uuid)
        -> Result<(), StoreError>;
}
