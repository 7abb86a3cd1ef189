use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    domain::entities::content_item::ContentMetadata,
    helper::error_chain_fmt,
    routes::{QueryVectorBodyData, QueryVectorResponseData},
};

/// Where live searches are sent
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ContentMetadata>, SearchClientError>;
}

/// Typed client of the `/api/pinecone/query_vector` endpoint
pub struct SearchClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

impl SearchClient {
    /// - `base_url`: address of a running service, for ex `http://127.0.0.1:8000`
    pub fn try_new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SearchBackend for SearchClient {
    #[tracing::instrument(name = "Sending search request", skip(self))]
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<ContentMetadata>, SearchClientError> {
        let response = self
            .client
            .post(format!("{}/api/pinecone/query_vector", self.base_url))
            .json(&QueryVectorBodyData {
                message_content: Some(query.to_string()),
                top_k: Some(top_k),
            })
            .send()
            .await
            .map_err(|e| SearchClientError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Error bodies are `{ "error": ... }`, anything else is kept as is
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|response| response.error)
                .unwrap_or(body);

            error!(status = status.as_u16(), %message, "Search request failed");
            return Err(SearchClientError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let response: QueryVectorResponseData = response
            .json()
            .await
            .map_err(|e| SearchClientError::RequestError(e.to_string()))?;

        debug!(nb_results = response.retrieved_data.len(), "Search response");
        Ok(response.retrieved_data)
    }
}

#[derive(thiserror::Error, Clone, PartialEq)]
pub enum SearchClientError {
    #[error("Search request could not be sent: {0}")]
    RequestError(String),
    #[error("Search failed with status {status}: {message}")]
    ApiError { status: u16, message: String },
}

impl std::fmt::Debug for SearchClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
