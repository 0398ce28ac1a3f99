mod admin;
mod clients;
mod subscriptions;

pub use admin::*;
pub use clients::*;
pub use subscriptions::*;

use actix_web::HttpResponse;

use crate::domain::ExternalId;
use crate::error::CampaignError;

// Malformed client ids can never match a client.
fn parse_client_id(client_id: String) -> Result<ExternalId, CampaignError> {
    ExternalId::parse(client_id).map_err(CampaignError::NotFound)
}

/// Endpoint used by clients to know if the server is working
#[tracing::instrument(name = "Health Check handler")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
