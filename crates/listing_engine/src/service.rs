use std::time::Duration;

use listing_logging::{listing_info, listing_warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::wire::{
    AskSuggestionBody, DeclineBody, HistoryBody, HistoryEntry, SubmitBody, SubmitReply,
    SuggestionReply,
};
use crate::{FailureKind, ServiceError};

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            // Generation on the backend can take a while.
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// The backend endpoints a card talks to.
#[async_trait::async_trait]
pub trait RemoteService: Send + Sync {
    async fn ask_suggestion(
        &self,
        url: &Url,
        body: &AskSuggestionBody,
    ) -> Result<SuggestionReply, ServiceError>;

    async fn submit(&self, url: &Url, body: &SubmitBody) -> Result<SubmitReply, ServiceError>;

    async fn decline(&self, url: &Url, body: &DeclineBody) -> Result<(), ServiceError>;

    async fn history(
        &self,
        url: &Url,
        body: &HistoryBody,
    ) -> Result<Vec<HistoryEntry>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestService {
    client: reqwest::Client,
}

impl ReqwestService {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ServiceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client })
    }

    /// POSTs `body` as JSON and returns the raw response bytes of a 2xx reply.
    async fn post(&self, url: &Url, body: &impl Serialize) -> Result<Vec<u8>, ServiceError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ServiceError::new(
                FailureKind::InvalidUrl,
                format!("unsupported scheme in {url}"),
            ));
        }
        let payload = serde_json::to_vec(body)
            .map_err(|err| ServiceError::new(FailureKind::MalformedResponse, err.to_string()))?;

        listing_info!("POST {} ({} bytes)", url, payload.len());
        let response = self
            .client
            .post(url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            listing_warn!("POST {} answered {}", url, status);
            return Err(ServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        body: &impl Serialize,
    ) -> Result<T, ServiceError> {
        let bytes = self.post(url, body).await?;
        serde_json::from_slice(&bytes).map_err(|err| {
            listing_warn!("Unexpected payload from {}: {}", url, err);
            ServiceError::new(FailureKind::MalformedResponse, err.to_string())
        })
    }
}

#[async_trait::async_trait]
impl RemoteService for ReqwestService {
    async fn ask_suggestion(
        &self,
        url: &Url,
        body: &AskSuggestionBody,
    ) -> Result<SuggestionReply, ServiceError> {
        self.post_json(url, body).await
    }

    async fn submit(&self, url: &Url, body: &SubmitBody) -> Result<SubmitReply, ServiceError> {
        self.post_json(url, body).await
    }

    async fn decline(&self, url: &Url, body: &DeclineBody) -> Result<(), ServiceError> {
        // Acknowledgement only; the body is not inspected.
        self.post(url, body).await.map(|_| ())
    }

    async fn history(
        &self,
        url: &Url,
        body: &HistoryBody,
    ) -> Result<Vec<HistoryEntry>, ServiceError> {
        self.post_json(url, body).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ServiceError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ServiceError::new(FailureKind::Network, err.to_string())
}
