use async_trait::async_trait;

use crate::{domain::entities::content_item::Embeddings, helper::error_chain_fmt};

/// Turns a text into its embedding
#[async_trait]
pub trait EmbeddingsService: Send + Sync {
    async fn generate_embeddings(&self, text: &str) -> Result<Embeddings, EmbeddingsServiceError>;
}

#[derive(thiserror::Error)]
pub enum EmbeddingsServiceError {
    #[error("Failed to generate embedding: {0}")]
    RequestError(String),
    #[error("Failed to generate embedding: the API responded {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("Failed to generate embedding: no embedding in the response")]
    EmptyResponse,
}

impl std::fmt::Debug for EmbeddingsServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
