use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::campaign_monitor::CampaignMonitorClient;
use crate::domain::{ExternalId, NewSubscriber};
use crate::error::CampaignError;
use crate::membership::{add_subscriber_to_lists, remove_subscriber_from_list, Unsubscribed};
use crate::routes::parse_client_id;
use crate::store::CampaignStore;

#[derive(Deserialize, Debug)]
pub struct SubscribeBody {
    pub name: String,
    pub email: String,
    pub lists: Vec<Uuid>,
}

#[tracing::instrument(
    name = "Subscribing to lists handler",
    skip(body, store, gateway),
    fields(
        subscriber_email = %body.email,
        subscriber_name = %body.name
    )
)]
pub async fn subscribe_to_lists(
    client_id: web::Path<String>,
    body: web::Json<SubscribeBody>,
    store: web::Data<dyn CampaignStore>,
    gateway: web::Data<CampaignMonitorClient>,
) -> Result<HttpResponse, CampaignError> {
    let client_id = parse_client_id(client_id.into_inner())?;
    let body = body.into_inner();
    let new_subscriber =
        NewSubscriber::parse(body.name, body.email).map_err(CampaignError::Validation)?;

    let subscriber = add_subscriber_to_lists(
        store.get_ref(),
        gateway.get_ref(),
        &client_id,
        new_subscriber,
        &body.lists,
    )
    .await?;

    Ok(HttpResponse::Created().json(subscriber))
}

#[tracing::instrument(name = "Unsubscribing from a list handler", skip(store, gateway))]
pub async fn unsubscribe_from_list(
    path: web::Path<(String, String, Uuid)>,
    store: web::Data<dyn CampaignStore>,
    gateway: web::Data<CampaignMonitorClient>,
) -> Result<HttpResponse, CampaignError> {
    let (client_id, list_id, subscriber_id) = path.into_inner();
    let client_id = parse_client_id(client_id)?;
    let list_id = ExternalId::parse(list_id).map_err(CampaignError::NotFound)?;

    let outcome = remove_subscriber_from_list(
        store.get_ref(),
        gateway.get_ref(),
        &client_id,
        &list_id,
        subscriber_id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "subscriber_deleted": outcome == Unsubscribed::Deleted
    })))
}
