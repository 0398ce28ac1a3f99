use actix_web::{http::StatusCode, ResponseError};

use crate::campaign_monitor::UpstreamError;
use crate::store::StoreError;

/// Failure of a synchronization or membership operation.
#[derive(thiserror::Error)]
pub enum CampaignError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Failed to talk to Campaign Monitor.")]
    Upstream(#[from] UpstreamError),
    #[error("Failed to access the local store.")]
    Store(#[source] StoreError),
}

impl From<StoreError> for CampaignError {
    fn from(err: StoreError) -> Self {
        match err {
            // Uniqueness is part of validating a record before it is saved.
            StoreError::Conflict(message) => CampaignError::Validation(message),
            err => CampaignError::Store(err),
        }
    }
}

impl std::fmt::Debug for CampaignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;

        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            write!(f, "\nCaused by:\n\t{}", cause)?;
            source = cause.source();
        }

        Ok(())
    }
}

impl ResponseError for CampaignError {
    fn status_code(&self) -> StatusCode {
        match self {
            CampaignError::Validation(_) => StatusCode::BAD_REQUEST,
            CampaignError::NotFound(_) => StatusCode::NOT_FOUND,
            CampaignError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CampaignError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
