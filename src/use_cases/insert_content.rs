use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
    domain::entities::content_item::{ContentMetadata, NewContent, NewContentError},
    helper::error_chain_fmt,
    ports::{
        embeddings_service::{EmbeddingsService, EmbeddingsServiceError},
        vector_index_repository::{VectorIndexRepository, VectorIndexRepositoryError},
    },
};

#[derive(Debug, Clone, Default)]
pub struct InsertContentRequest {
    pub title: Option<String>,
    /// Raw text the embedding is computed from
    pub text: Option<String>,
    pub metadata: Option<ContentMetadata>,
}

/// Embeds a submitted content and stores it in the vector index under a new id.
///
/// Not idempotent: submitting the same content twice stores two items.
pub struct InsertContentUseCase {
    embeddings_service: Arc<dyn EmbeddingsService>,
    vector_index_repository: Arc<dyn VectorIndexRepository>,
}

impl InsertContentUseCase {
    pub fn new(
        embeddings_service: Arc<dyn EmbeddingsService>,
        vector_index_repository: Arc<dyn VectorIndexRepository>,
    ) -> Self {
        Self {
            embeddings_service,
            vector_index_repository,
        }
    }

    #[tracing::instrument(name = "Inserting content", skip(self, request), fields(title = ?request.title))]
    pub async fn execute(&self, request: InsertContentRequest) -> Result<Uuid, InsertContentError> {
        let InsertContentRequest {
            title,
            text,
            metadata,
        } = request;
        let content = NewContent::parse(title, text, metadata)?;

        let index = self.vector_index_repository.ensure_index().await?;

        let embedding = self
            .embeddings_service
            .generate_embeddings(&content.text)
            .await?;

        let expected = self.vector_index_repository.dimension();
        if embedding.len() != expected {
            return Err(InsertContentError::DimensionMismatch {
                expected,
                actual: embedding.len(),
            });
        }

        let item = content.into_item(embedding);
        self.vector_index_repository.upsert(&index, &item).await?;

        info!(id = %item.id, "Content inserted");
        Ok(item.id)
    }
}

#[derive(thiserror::Error)]
pub enum InsertContentError {
    #[error(transparent)]
    InvalidContent(#[from] NewContentError),
    #[error(transparent)]
    EmbeddingsError(#[from] EmbeddingsServiceError),
    #[error(transparent)]
    VectorIndexError(#[from] VectorIndexRepositoryError),
    #[error("Embedding has {actual} dimensions but the index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Debug for InsertContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
