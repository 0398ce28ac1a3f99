pub mod campaign_list;
pub mod client;
pub mod email_address;
pub mod external_id;
pub mod label;
pub mod subscriber;
pub mod subscriber_state;

pub use campaign_list::{CampaignList, NewCampaignList};
pub use client::{Client, NewClient};
pub use email_address::EmailAddress;
pub use external_id::ExternalId;
pub use label::Label;
pub use subscriber::{NewSubscriber, Subscriber};
pub use subscriber_state::SubscriberState;
