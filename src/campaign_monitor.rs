use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::time;

use crate::domain::{EmailAddress, ExternalId, SubscriberState};

const PAGE_SIZE: u32 = 1000;

/// HTTP gateway to the Campaign Monitor API.
///
/// Every call authenticates with the single API key given at construction and
/// fails fast: there is no retry, and no timeout unless one is configured.
pub struct CampaignMonitorClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

#[derive(thiserror::Error)]
pub enum UpstreamError {
    #[error("Campaign Monitor could not be reached.")]
    Transport(#[from] reqwest::Error),
    #[error("Campaign Monitor rejected the request ({status}): {message}")]
    Rejected {
        status: reqwest::StatusCode,
        message: String,
    },
}

impl std::fmt::Debug for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::Transport(err) => write!(f, "{}\nCaused by:\n\t{:?}", self, err),
            UpstreamError::Rejected { .. } => write!(f, "{}", self),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientDetails {
    #[serde(rename = "ClientID")]
    pub client_id: String,
    pub company_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub email_address: String,
    pub country: String,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListDescriptor {
    #[serde(rename = "ListID")]
    pub list_id: String,
    pub name: String,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriberDescriptor {
    pub email_address: String,
    #[serde(default)]
    pub name: String,
    pub state: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ClientResponse {
    basic_details: ClientDetails,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SubscribersPage {
    results: Vec<SubscriberDescriptor>,
    page_number: u32,
    number_of_pages: u32,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiFailure {
    message: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct ImportSubscriberBody<'a> {
    email_address: &'a str,
    name: &'a str,
    custom_fields: Vec<serde_json::Value>,
    resubscribe: bool,
    consent_to_track: &'a str,
}

impl CampaignMonitorClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Option<time::Duration>,
    ) -> Result<CampaignMonitorClient, reqwest::Error> {
        let mut builder = Client::builder();

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(CampaignMonitorClient {
            http_client: builder.build()?,
            base_url,
            api_key,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, format!("{}/{}", self.base_url, path))
            .basic_auth(self.api_key.expose_secret(), Some("x"))
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, UpstreamError> {
        let response = check_status(request.send().await?).await?;

        Ok(response.json().await?)
    }

    #[tracing::instrument(name = "Fetching client details from Campaign Monitor", skip(self))]
    pub async fn get_client_details(
        &self,
        client_id: &ExternalId,
    ) -> Result<ClientDetails, UpstreamError> {
        let request = self.request(Method::GET, &format!("clients/{}.json", client_id));
        let response: ClientResponse = self.get_json(request).await?;

        Ok(response.basic_details)
    }

    #[tracing::instrument(name = "Fetching client lists from Campaign Monitor", skip(self))]
    pub async fn get_client_lists(
        &self,
        client_id: &ExternalId,
    ) -> Result<Vec<ListDescriptor>, UpstreamError> {
        let request = self.request(Method::GET, &format!("clients/{}/lists.json", client_id));

        self.get_json(request).await
    }

    /// Subscribers of a list across the given states, fetched page by page as
    /// the returned feed is consumed.
    pub fn list_subscribers(
        &self,
        list_id: &ExternalId,
        states: &[SubscriberState],
    ) -> SubscriberFeed<'_> {
        SubscriberFeed {
            client: self,
            list_id: list_id.clone(),
            pending_states: states.iter().copied().collect(),
            current: None,
            buffer: VecDeque::new(),
        }
    }

    #[tracing::instrument(name = "Fetching a page of list subscribers", skip(self))]
    async fn get_subscribers_page(
        &self,
        list_id: &ExternalId,
        state: SubscriberState,
        page: u32,
    ) -> Result<SubscribersPage, UpstreamError> {
        let request = self
            .request(
                Method::GET,
                &format!("lists/{}/{}.json", list_id, state.endpoint()),
            )
            .query(&[
                ("page", page.to_string()),
                ("pagesize", PAGE_SIZE.to_string()),
                ("orderfield", "email".to_string()),
                ("orderdirection", "asc".to_string()),
            ]);

        self.get_json(request).await
    }

    /// Adds the subscriber to the list, or updates them if already there.
    #[tracing::instrument(
        name = "Importing a subscriber into a Campaign Monitor list",
        skip(self, name, email),
        fields(subscriber_email = %email)
    )]
    pub async fn import_subscriber(
        &self,
        list_id: &ExternalId,
        name: &str,
        email: &EmailAddress,
        resubscribe: bool,
    ) -> Result<(), UpstreamError> {
        let body = ImportSubscriberBody {
            email_address: email.as_ref(),
            name,
            custom_fields: Vec::new(),
            resubscribe,
            consent_to_track: "Unchanged",
        };
        let request = self
            .request(Method::POST, &format!("subscribers/{}.json", list_id))
            .json(&body);

        check_status(request.send().await?).await?;

        Ok(())
    }

    #[tracing::instrument(
        name = "Removing a subscriber from a Campaign Monitor list",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn remove_subscriber(
        &self,
        list_id: &ExternalId,
        email: &EmailAddress,
    ) -> Result<(), UpstreamError> {
        let request = self
            .request(Method::DELETE, &format!("subscribers/{}.json", list_id))
            .query(&[("email", email.as_ref())]);

        check_status(request.send().await?).await?;

        Ok(())
    }
}

// Turns 4xx/5xx responses into `Rejected`, keeping the provider's message when it sent one.
async fn check_status(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiFailure>(&body)
        .map(|failure| failure.message)
        .unwrap_or(body);

    Err(UpstreamError::Rejected { status, message })
}

/// Lazy, single-pass sequence of the subscribers of one list.
///
/// States are walked in the order given; within a state pages are requested
/// until the provider reports the last one.
pub struct SubscriberFeed<'a> {
    client: &'a CampaignMonitorClient,
    list_id: ExternalId,
    pending_states: VecDeque<SubscriberState>,
    // State being walked and the next page to request, if any.
    current: Option<(SubscriberState, u32)>,
    buffer: VecDeque<SubscriberDescriptor>,
}

impl SubscriberFeed<'_> {
    pub async fn next(&mut self) -> Result<Option<SubscriberDescriptor>, UpstreamError> {
        loop {
            if let Some(descriptor) = self.buffer.pop_front() {
                return Ok(Some(descriptor));
            }

            let (state, page) = match self.current.take() {
                Some(cursor) => cursor,
                None => match self.pending_states.pop_front() {
                    Some(state) => (state, 1),
                    None => return Ok(None),
                },
            };

            let response = self
                .client
                .get_subscribers_page(&self.list_id, state, page)
                .await?;

            if response.page_number < response.number_of_pages {
                self.current = Some((state, response.page_number + 1));
            }
            self.buffer.extend(response.results);
        }
    }
}
