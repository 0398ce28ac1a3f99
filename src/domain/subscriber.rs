use uuid::Uuid;

use crate::campaign_monitor::SubscriberDescriptor;
use crate::domain::email_address::EmailAddress;
use crate::domain::label::Label;
use crate::domain::subscriber_state::SubscriberState;

/// A person identified by email, member of zero or more lists.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: EmailAddress,
    pub name: Label,
    pub state: SubscriberState,
}

#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub email: EmailAddress,
    pub name: Label,
    pub state: SubscriberState,
}

impl NewSubscriber {
    /// Subscribers added by hand need a name. Only mirrored ones may lack it.
    pub fn parse(name: String, email: String) -> Result<NewSubscriber, String> {
        Ok(NewSubscriber {
            email: EmailAddress::parse(email)?,
            name: Label::parse(name)?,
            state: SubscriberState::default(),
        })
    }
}

impl TryFrom<SubscriberDescriptor> for NewSubscriber {
    type Error = String;

    fn try_from(descriptor: SubscriberDescriptor) -> Result<Self, Self::Error> {
        Ok(NewSubscriber {
            email: EmailAddress::parse(descriptor.email_address)?,
            name: Label::parse_blankable(descriptor.name)?,
            state: SubscriberState::parse(descriptor.state)?,
        })
    }
}

impl std::fmt::Display for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.name.is_blank() {
            write!(f, "Subscriber \"{}\"", self.email)
        } else {
            write!(f, "Subscriber \"{}\"", self.name)
        }
    }
}
