use uuid::Uuid;

use campaign_mirror::config::get_configuration;
use campaign_mirror::domain::{ExternalId, Label, NewCampaignList};
use campaign_mirror::store::{CampaignStore, PgCampaignStore, StoreError};

use crate::helpers::{configure_db, new_client, new_subscriber, CLIENT_ID, LIST_ID};

async fn spawn_store() -> PgCampaignStore {
    let mut config = get_configuration().expect("Missing configuration file.");
    let db_test_name = format!("db_{}", Uuid::new_v4().to_string().replace('-', "_"));
    let db_pool = configure_db(&mut config.database, db_test_name).await;

    PgCampaignStore::new(db_pool)
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn duplicate_client_external_id_is_a_conflict() {
    let store = spawn_store().await;

    store.insert_client(&new_client(CLIENT_ID)).await.unwrap();
    let duplicate = store.insert_client(&new_client(CLIENT_ID)).await;

    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn subscriber_is_inserted_with_its_memberships() {
    let store = spawn_store().await;
    let client = store.insert_client(&new_client(CLIENT_ID)).await.unwrap();
    let list = store
        .insert_list(&NewCampaignList {
            client_id: client.id,
            external_id: ExternalId::parse(LIST_ID.to_string()).unwrap(),
            name: Label::parse("Newsletter".to_string()).unwrap(),
        })
        .await
        .unwrap();

    let subscriber = store
        .insert_subscriber(&new_subscriber("alice@example.com"), &[list.id])
        .await
        .unwrap();

    assert_eq!(
        store.lists_of_subscriber(subscriber.id).await.unwrap(),
        vec![list.clone()]
    );
    assert_eq!(
        store.subscribers_of_list(list.id).await.unwrap(),
        vec![subscriber.clone()]
    );
    assert!(matches!(
        store
            .insert_subscriber(&new_subscriber("alice@example.com"), &[])
            .await,
        Err(StoreError::Conflict(_))
    ));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn deleting_a_client_row_cascades_to_lists_and_memberships() {
    let store = spawn_store().await;
    let client = store.insert_client(&new_client(CLIENT_ID)).await.unwrap();
    let list = store
        .insert_list(&NewCampaignList {
            client_id: client.id,
            external_id: ExternalId::parse(LIST_ID.to_string()).unwrap(),
            name: Label::parse("Newsletter".to_string()).unwrap(),
        })
        .await
        .unwrap();
    let subscriber = store
        .insert_subscriber(&new_subscriber("alice@example.com"), &[list.id])
        .await
        .unwrap();

    store.delete_client_row(client.id).await.unwrap();

    assert!(store.find_list(list.id).await.unwrap().is_none());
    assert!(store
        .lists_of_subscriber(subscriber.id)
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .find_client_by_external_id(&client.external_id)
        .await
        .unwrap()
        .is_none());
}
