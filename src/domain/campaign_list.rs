use uuid::Uuid;

use crate::campaign_monitor::ListDescriptor;
use crate::domain::external_id::ExternalId;
use crate::domain::label::Label;

/// A mailing list owned by exactly one client.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CampaignList {
    pub id: Uuid,
    pub client_id: Uuid,
    pub external_id: ExternalId,
    pub name: Label,
}

#[derive(Debug, Clone)]
pub struct NewCampaignList {
    pub client_id: Uuid,
    pub external_id: ExternalId,
    pub name: Label,
}

impl NewCampaignList {
    pub fn parse(client_id: Uuid, descriptor: ListDescriptor) -> Result<NewCampaignList, String> {
        Ok(NewCampaignList {
            client_id,
            external_id: ExternalId::parse(descriptor.list_id)?,
            name: Label::parse(descriptor.name)?,
        })
    }
}

impl std::fmt::Display for CampaignList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "List \"{}\" ({})", self.name, self.external_id)
    }
}
