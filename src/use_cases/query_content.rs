use std::sync::Arc;

use tracing::info;

use crate::{
    domain::entities::{
        content_item::ContentMetadata,
        search_query::{SearchQuery, SearchQueryError},
    },
    helper::error_chain_fmt,
    ports::{
        embeddings_service::{EmbeddingsService, EmbeddingsServiceError},
        vector_index_repository::{VectorIndexRepository, VectorIndexRepositoryError},
    },
};

#[derive(Debug, Clone, Default)]
pub struct QueryContentRequest {
    pub text: Option<String>,
    pub top_k: Option<usize>,
}

/// Finds the contents semantically closest to a free text.
///
/// Ranking is the one of the index (its configured metric); scores are not exposed.
pub struct QueryContentUseCase {
    embeddings_service: Arc<dyn EmbeddingsService>,
    vector_index_repository: Arc<dyn VectorIndexRepository>,
}

impl QueryContentUseCase {
    pub fn new(
        embeddings_service: Arc<dyn EmbeddingsService>,
        vector_index_repository: Arc<dyn VectorIndexRepository>,
    ) -> Self {
        Self {
            embeddings_service,
            vector_index_repository,
        }
    }

    #[tracing::instrument(name = "Querying content", skip(self))]
    pub async fn execute(
        &self,
        request: QueryContentRequest,
    ) -> Result<Vec<ContentMetadata>, QueryContentError> {
        let query = SearchQuery::parse(request.text, request.top_k)?;

        let index = self.vector_index_repository.ensure_index().await?;

        let embedding = self
            .embeddings_service
            .generate_embeddings(&query.text)
            .await?;

        let matches = self
            .vector_index_repository
            .query(&index, &embedding, query.top_k)
            .await?;

        let results: Vec<ContentMetadata> = matches
            .into_iter()
            .filter_map(|found| found.metadata)
            .take(query.top_k)
            .collect();

        info!(nb_results = results.len(), "Content queried");
        Ok(results)
    }
}

#[derive(thiserror::Error)]
pub enum QueryContentError {
    #[error(transparent)]
    InvalidQuery(#[from] SearchQueryError),
    #[error(transparent)]
    EmbeddingsError(#[from] EmbeddingsServiceError),
    #[error(transparent)]
    VectorIndexError(#[from] VectorIndexRepositoryError),
}

impl std::fmt::Debug for QueryContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
