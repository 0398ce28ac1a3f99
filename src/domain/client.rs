use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::campaign_monitor::ClientDetails;
use crate::domain::email_address::EmailAddress;
use crate::domain::external_id::ExternalId;
use crate::domain::label::Label;

/// A Campaign Monitor account owner mirrored locally.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Client {
    pub id: Uuid,
    pub external_id: ExternalId,
    pub name: Label,
    pub email: Option<EmailAddress>,
    pub company: Label,
    pub country: Label,
    pub synced_at: DateTime<Utc>,
}

impl Client {
    pub fn display_name(&self) -> &str {
        if self.name.is_blank() {
            self.company.as_ref()
        } else {
            self.name.as_ref()
        }
    }
}

impl std::fmt::Display for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Client {} ({})", self.display_name(), self.external_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewClient {
    pub external_id: ExternalId,
    pub name: Label,
    pub email: Option<EmailAddress>,
    pub company: Label,
    pub country: Label,
}

impl TryFrom<ClientDetails> for NewClient {
    type Error = String;

    fn try_from(details: ClientDetails) -> Result<Self, Self::Error> {
        Ok(NewClient {
            external_id: ExternalId::parse(details.client_id)?,
            name: Label::parse_blankable(details.contact_name)?,
            email: EmailAddress::parse_optional(details.email_address)?,
            company: Label::parse(details.company_name)?,
            country: Label::parse(details.country)?,
        })
    }
}
