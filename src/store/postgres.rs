use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::domain::{
    CampaignList, Client, EmailAddress, ExternalId, Label, NewCampaignList, NewClient,
    NewSubscriber, Subscriber, SubscriberState,
};
use crate::store::{CampaignStore, StoreError};

const UNIQUE_VIOLATION: &str = "23505";

pub struct PgCampaignStore {
    db_pool: PgPool,
}

impl PgCampaignStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

fn decode<T>(parsed: Result<T, String>) -> Result<T, sqlx::Error> {
    parsed.map_err(|err| sqlx::Error::Decode(err.into()))
}

fn client_from_row(row: PgRow) -> Result<Client, sqlx::Error> {
    Ok(Client {
        id: row.try_get("id")?,
        external_id: decode(ExternalId::parse(row.try_get("external_id")?))?,
        name: decode(Label::parse_blankable(row.try_get("name")?))?,
        email: decode(EmailAddress::parse_optional(row.try_get("email")?))?,
        company: decode(Label::parse(row.try_get("company")?))?,
        country: decode(Label::parse(row.try_get("country")?))?,
        synced_at: row.try_get("synced_at")?,
    })
}

fn list_from_row(row: PgRow) -> Result<CampaignList, sqlx::Error> {
    Ok(CampaignList {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        external_id: decode(ExternalId::parse(row.try_get("external_id")?))?,
        name: decode(Label::parse(row.try_get("name")?))?,
    })
}

fn subscriber_from_row(row: PgRow) -> Result<Subscriber, sqlx::Error> {
    Ok(Subscriber {
        id: row.try_get("id")?,
        email: decode(EmailAddress::parse(row.try_get("email")?))?,
        name: decode(Label::parse_blankable(row.try_get("name")?))?,
        state: decode(SubscriberState::parse(row.try_get("state")?))?,
    })
}

// Unique violations become conflicts so callers can report them as invalid input.
fn conflict_or_database(err: sqlx::Error, conflict: impl FnOnce() -> String) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Conflict(conflict())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl CampaignStore for PgCampaignStore {
    #[tracing::instrument(name = "Insert a client into the database", skip(self, client))]
    async fn insert_client(&self, client: &NewClient) -> Result<Client, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO campaign_clients (id, external_id, name, email, company, country, synced_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, external_id, name, email, company, country, synced_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(client.external_id.as_ref())
        .bind(client.name.as_ref())
        .bind(client.email.as_ref().map(AsRef::<str>::as_ref).unwrap_or_default())
        .bind(client.company.as_ref())
        .bind(client.country.as_ref())
        .bind(Utc::now())
        .try_map(client_from_row)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|err| {
            conflict_or_database(err, || {
                format!("A client with external ID {} already exists", client.external_id)
            })
        })
    }

    async fn find_client_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<Client>, StoreError> {
        let client = sqlx::query(
            r#"
            SELECT id, external_id, name, email, company, country, synced_at
            FROM campaign_clients
            WHERE external_id = $1
            "#,
        )
        .bind(external_id.as_ref())
        .try_map(client_from_row)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(client)
    }

    #[tracing::instrument(name = "Delete a client from the database", skip(self))]
    async fn delete_client_row(&self, client_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM campaign_clients WHERE id = $1")
            .bind(client_id)
            .execute(&self.db_pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(name = "Insert a list into the database", skip(self, list))]
    async fn insert_list(&self, list: &NewCampaignList) -> Result<CampaignList, StoreError> {
        let list = sqlx::query(
            r#"
            INSERT INTO campaign_lists (id, client_id, external_id, name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, client_id, external_id, name
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(list.client_id)
        .bind(list.external_id.as_ref())
        .bind(list.name.as_ref())
        .try_map(list_from_row)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(list)
    }

    async fn find_list(&self, list_id: Uuid) -> Result<Option<CampaignList>, StoreError> {
        let list = sqlx::query(
            "SELECT id, client_id, external_id, name FROM campaign_lists WHERE id = $1",
        )
        .bind(list_id)
        .try_map(list_from_row)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(list)
    }

    async fn lists_of_client(&self, client_id: Uuid) -> Result<Vec<CampaignList>, StoreError> {
        let lists = sqlx::query(
            r#"
            SELECT id, client_id, external_id, name
            FROM campaign_lists
            WHERE client_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(client_id)
        .try_map(list_from_row)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(lists)
    }

    #[tracing::instrument(name = "Delete a list from the database", skip(self))]
    async fn delete_list_row(&self, list_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM campaign_lists WHERE id = $1")
            .bind(list_id)
            .execute(&self.db_pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "Insert a subscriber and its memberships into the database",
        skip(self, subscriber),
        fields(subscriber_email = %subscriber.email)
    )]
    async fn insert_subscriber(
        &self,
        subscriber: &NewSubscriber,
        list_ids: &[Uuid],
    ) -> Result<Subscriber, StoreError> {
        let mut transaction = self.db_pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO campaign_subscribers (id, email, name, state)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, state
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(subscriber.email.as_ref())
        .bind(subscriber.name.as_ref())
        .bind(subscriber.state.as_ref())
        .try_map(subscriber_from_row)
        .fetch_one(&mut transaction)
        .await
        .map_err(|err| {
            conflict_or_database(err, || {
                format!("A subscriber with email {} already exists", subscriber.email)
            })
        })?;

        for list_id in list_ids {
            sqlx::query(
                r#"
                INSERT INTO campaign_list_memberships (subscriber_id, list_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(inserted.id)
            .bind(*list_id)
            .execute(&mut transaction)
            .await?;
        }

        transaction.commit().await?;

        Ok(inserted)
    }

    #[tracing::instrument(name = "Update a subscriber in the database", skip(self, subscriber))]
    async fn update_subscriber(&self, subscriber: &Subscriber) -> Result<(), StoreError> {
        sqlx::query("UPDATE campaign_subscribers SET name = $2, state = $3 WHERE id = $1")
            .bind(subscriber.id)
            .bind(subscriber.name.as_ref())
            .bind(subscriber.state.as_ref())
            .execute(&self.db_pool)
            .await?;

        Ok(())
    }

    async fn find_subscriber(&self, subscriber_id: Uuid) -> Result<Option<Subscriber>, StoreError> {
        let subscriber =
            sqlx::query("SELECT id, email, name, state FROM campaign_subscribers WHERE id = $1")
                .bind(subscriber_id)
                .try_map(subscriber_from_row)
                .fetch_optional(&self.db_pool)
                .await?;

        Ok(subscriber)
    }

    async fn find_subscriber_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Subscriber>, StoreError> {
        let subscriber =
            sqlx::query("SELECT id, email, name, state FROM campaign_subscribers WHERE email = $1")
                .bind(email.as_ref())
                .try_map(subscriber_from_row)
                .fetch_optional(&self.db_pool)
                .await?;

        Ok(subscriber)
    }

    async fn subscribers_of_list(&self, list_id: Uuid) -> Result<Vec<Subscriber>, StoreError> {
        let subscribers = sqlx::query(
            r#"
            SELECT s.id, s.email, s.name, s.state
            FROM campaign_subscribers s
            JOIN campaign_list_memberships m ON m.subscriber_id = s.id
            WHERE m.list_id = $1
            ORDER BY s.email
            "#,
        )
        .bind(list_id)
        .try_map(subscriber_from_row)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(subscribers)
    }

    async fn lists_of_subscriber(
        &self,
        subscriber_id: Uuid,
    ) -> Result<Vec<CampaignList>, StoreError> {
        let lists = sqlx::query(
            r#"
            SELECT l.id, l.client_id, l.external_id, l.name
            FROM campaign_lists l
            JOIN campaign_list_memberships m ON m.list_id = l.id
            WHERE m.subscriber_id = $1
            ORDER BY l.name, l.id
            "#,
        )
        .bind(subscriber_id)
        .try_map(list_from_row)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(lists)
    }

    #[tracing::instrument(name = "Delete a subscriber from the database", skip(self))]
    async fn delete_subscriber_row(&self, subscriber_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM campaign_subscribers WHERE id = $1")
            .bind(subscriber_id)
            .execute(&self.db_pool)
            .await?;

        Ok(())
    }

    async fn add_membership(&self, subscriber_id: Uuid, list_id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO campaign_list_memberships (subscriber_id, list_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(subscriber_id)
        .bind(list_id)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    async fn remove_membership(
        &self,
        subscriber_id: Uuid,
        list_id: Uuid,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM campaign_list_memberships WHERE subscriber_id = $1 AND list_id = $2",
        )
        .bind(subscriber_id)
        .bind(list_id)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }
}
