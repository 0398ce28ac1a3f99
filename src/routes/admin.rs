use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::campaign_monitor::CampaignMonitorClient;
use crate::cascade;
use crate::domain::{CampaignList, Subscriber};
use crate::error::CampaignError;
use crate::membership::MembershipCoordinator;
use crate::routes::parse_client_id;
use crate::store::CampaignStore;

#[derive(Deserialize, Debug)]
pub struct ListSubscribersBody {
    pub subscribers: HashSet<Uuid>,
}

#[derive(Deserialize, Debug)]
pub struct SubscriberListsBody {
    pub lists: HashSet<Uuid>,
}

async fn find_list(store: &dyn CampaignStore, list_id: Uuid) -> Result<CampaignList, CampaignError> {
    store
        .find_list(list_id)
        .await?
        .ok_or_else(|| CampaignError::NotFound(format!("List {} not found", list_id)))
}

async fn find_subscriber(
    store: &dyn CampaignStore,
    subscriber_id: Uuid,
) -> Result<Subscriber, CampaignError> {
    store
        .find_subscriber(subscriber_id)
        .await?
        .ok_or_else(|| CampaignError::NotFound(format!("Subscriber {} not found", subscriber_id)))
}

#[tracing::instrument(name = "Delete client handler", skip(store, gateway))]
pub async fn delete_client(
    client_id: web::Path<String>,
    store: web::Data<dyn CampaignStore>,
    gateway: web::Data<CampaignMonitorClient>,
) -> Result<HttpResponse, CampaignError> {
    let client_id = parse_client_id(client_id.into_inner())?;
    let client = store
        .find_client_by_external_id(&client_id)
        .await?
        .ok_or_else(|| CampaignError::NotFound(format!("Client {} not found", client_id)))?;

    cascade::delete_client(store.get_ref(), gateway.get_ref(), &client).await?;

    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "Delete list handler", skip(store, gateway))]
pub async fn delete_list(
    list_id: web::Path<Uuid>,
    store: web::Data<dyn CampaignStore>,
    gateway: web::Data<CampaignMonitorClient>,
) -> Result<HttpResponse, CampaignError> {
    let list = find_list(store.get_ref(), list_id.into_inner()).await?;

    cascade::delete_list(store.get_ref(), gateway.get_ref(), &list).await?;

    Ok(HttpResponse::Ok().finish())
}

/// Deletes the subscribers of a list (only).
#[tracing::instrument(name = "Purge list handler", skip(store, gateway))]
pub async fn purge_list(
    list_id: web::Path<Uuid>,
    store: web::Data<dyn CampaignStore>,
    gateway: web::Data<CampaignMonitorClient>,
) -> Result<HttpResponse, CampaignError> {
    let list = find_list(store.get_ref(), list_id.into_inner()).await?;

    cascade::purge_list(store.get_ref(), gateway.get_ref(), &list).await?;

    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "Delete subscriber handler", skip(store, gateway))]
pub async fn delete_subscriber(
    subscriber_id: web::Path<Uuid>,
    store: web::Data<dyn CampaignStore>,
    gateway: web::Data<CampaignMonitorClient>,
) -> Result<HttpResponse, CampaignError> {
    let subscriber = find_subscriber(store.get_ref(), subscriber_id.into_inner()).await?;

    cascade::delete_subscriber(store.get_ref(), gateway.get_ref(), &subscriber).await?;

    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "Replace list subscribers handler", skip(store, gateway))]
pub async fn replace_list_subscribers(
    list_id: web::Path<Uuid>,
    body: web::Json<ListSubscribersBody>,
    store: web::Data<dyn CampaignStore>,
    gateway: web::Data<CampaignMonitorClient>,
) -> Result<HttpResponse, CampaignError> {
    let list = find_list(store.get_ref(), list_id.into_inner()).await?;

    let diff = MembershipCoordinator::new(store.get_ref(), gateway.get_ref())
        .replace_list_subscribers(&list, &body.subscribers)
        .await?;

    Ok(HttpResponse::Ok().json(diff))
}

#[tracing::instrument(name = "Replace subscriber lists handler", skip(store, gateway))]
pub async fn replace_subscriber_lists(
    subscriber_id: web::Path<Uuid>,
    body: web::Json<SubscriberListsBody>,
    store: web::Data<dyn CampaignStore>,
    gateway: web::Data<CampaignMonitorClient>,
) -> Result<HttpResponse, CampaignError> {
    let subscriber = find_subscriber(store.get_ref(), subscriber_id.into_inner()).await?;

    let diff = MembershipCoordinator::new(store.get_ref(), gateway.get_ref())
        .replace_subscriber_lists(&subscriber, &body.lists)
        .await?;

    Ok(HttpResponse::Ok().json(diff))
}
