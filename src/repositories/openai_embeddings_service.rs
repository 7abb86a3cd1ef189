use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    configuration::OpenAISettings,
    domain::entities::content_item::Embeddings,
    ports::embeddings_service::{EmbeddingsService, EmbeddingsServiceError},
};

/// Embeddings generated by the OpenAI embeddings API (`/v1/embeddings`).
///
/// Using `text-embedding-ada-002` by default: 1536 dimensions.
pub struct OpenAIEmbeddingsService {
    client: Client,
    base_url: String,
    api_key: Secret<String>,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Embeddings,
}

impl OpenAIEmbeddingsService {
    pub fn try_new(settings: &OpenAISettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingsService for OpenAIEmbeddingsService {
    #[tracing::instrument(name = "Generating embedding", skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn generate_embeddings(&self, text: &str) -> Result<Embeddings, EmbeddingsServiceError> {
        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&EmbeddingsRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| EmbeddingsServiceError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Error response from the embeddings API");
            return Err(EmbeddingsServiceError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let response: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingsServiceError::RequestError(e.to_string()))?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or(EmbeddingsServiceError::EmptyResponse)?;

        debug!(dimension = embedding.len(), "Generated embedding");
        Ok(embedding)
    }
}
