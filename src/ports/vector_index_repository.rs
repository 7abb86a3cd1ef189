use async_trait::async_trait;

use crate::{
    domain::entities::content_item::{ContentItem, ContentMetadata},
    helper::error_chain_fmt,
};

/// Where the data plane of an existing index can be reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHandle {
    pub host: String,
}

/// Outcome of an existence check. Failing to check is an error, never `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexStatus {
    Exists(IndexHandle),
    Absent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub score: Option<f32>,
    pub metadata: Option<ContentMetadata>,
}

/// Managed vector index holding the content items
#[async_trait]
pub trait VectorIndexRepository: Send + Sync {
    /// Dimension the index is (or will be) created with
    fn dimension(&self) -> usize;

    async fn describe_index(&self) -> Result<IndexStatus, VectorIndexRepositoryError>;

    /// Creates the index. Succeeds if the index already exists.
    async fn create_index(&self) -> Result<IndexHandle, VectorIndexRepositoryError>;

    async fn upsert(
        &self,
        index: &IndexHandle,
        item: &ContentItem,
    ) -> Result<(), VectorIndexRepositoryError>;

    /// Nearest neighbours of `vector`, closest first, metadata included
    async fn query(
        &self,
        index: &IndexHandle,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, VectorIndexRepositoryError>;

    /// Creates the index if it is absent
    async fn ensure_index(&self) -> Result<IndexHandle, VectorIndexRepositoryError> {
        match self.describe_index().await? {
            IndexStatus::Exists(index) => Ok(index),
            IndexStatus::Absent => {
                tracing::info!("Vector index not found, creating it ...");
                self.create_index().await
            }
        }
    }
}

#[derive(thiserror::Error)]
pub enum VectorIndexRepositoryError {
    #[error("Error while calling the vector index to {operation}: {message}")]
    RequestError {
        operation: &'static str,
        message: String,
    },
    #[error("The vector index responded {status} to {operation}: {body}")]
    ApiError {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("The vector index {0} has no host yet")]
    MissingHost(String),
}

impl std::fmt::Debug for VectorIndexRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
