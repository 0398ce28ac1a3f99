use serde::{Deserialize, Serialize};

/// Lifecycle state of a subscriber as reported by Campaign Monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriberState {
    #[default]
    Active,
    Bounced,
    Deleted,
    Unconfirmed,
    Unsubscribed,
}

impl SubscriberState {
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriberState::Active)
    }

    pub fn parse(state: String) -> Result<SubscriberState, String> {
        match state.as_str() {
            "Active" => Ok(SubscriberState::Active),
            "Bounced" => Ok(SubscriberState::Bounced),
            "Deleted" => Ok(SubscriberState::Deleted),
            "Unconfirmed" => Ok(SubscriberState::Unconfirmed),
            "Unsubscribed" => Ok(SubscriberState::Unsubscribed),
            _ => Err(format!("{} is not a valid subscriber state", state)),
        }
    }

    /// Path segment of the provider endpoint listing subscribers in this state.
    pub fn endpoint(&self) -> &'static str {
        match self {
            SubscriberState::Active => "active",
            SubscriberState::Bounced => "bounced",
            SubscriberState::Deleted => "deleted",
            SubscriberState::Unconfirmed => "unconfirmed",
            SubscriberState::Unsubscribed => "unsubscribed",
        }
    }
}

impl AsRef<str> for SubscriberState {
    fn as_ref(&self) -> &str {
        match self {
            SubscriberState::Active => "Active",
            SubscriberState::Bounced => "Bounced",
            SubscriberState::Deleted => "Deleted",
            SubscriberState::Unconfirmed => "Unconfirmed",
            SubscriberState::Unsubscribed => "Unsubscribed",
        }
    }
}
