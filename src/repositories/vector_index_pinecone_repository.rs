use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{info, warn};

use crate::{
    configuration::PineconeSettings,
    domain::entities::content_item::{ContentItem, ContentMetadata},
    ports::vector_index_repository::{
        IndexHandle, IndexStatus, QueryMatch, VectorIndexRepository, VectorIndexRepositoryError,
    },
};

/// Repository for content items persisted in a Pinecone serverless index.
///
/// Indexes are described and created through the control plane, vectors are
/// upserted and queried through the data plane host of the index.
pub struct VectorIndexPineconeRepository {
    client: Client,
    api_key: Secret<String>,
    api_version: String,
    control_plane_url: String,
    index_name: String,
    dimension: usize,
    metric: String,
    cloud: String,
    region: String,
    index_host: Option<String>,
}

#[derive(Deserialize)]
struct IndexDescription {
    host: Option<String>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: [VectorRecord<'a>; 1],
}

#[derive(Serialize)]
struct VectorRecord<'a> {
    id: String,
    values: &'a [f32],
    metadata: &'a ContentMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<MatchRecord>,
}

#[derive(Deserialize)]
struct MatchRecord {
    id: String,
    score: Option<f32>,
    metadata: Option<JsonValue>,
}

impl VectorIndexPineconeRepository {
    pub fn try_new(settings: &PineconeSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            api_version: settings.api_version.clone(),
            control_plane_url: settings.control_plane_url.trim_end_matches('/').to_string(),
            index_name: settings.index_name.clone(),
            dimension: settings.dimension,
            metric: settings.metric.clone(),
            cloud: settings.cloud.clone(),
            region: settings.region.clone(),
            index_host: settings.index_host.clone(),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn authenticated(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Api-Key", self.api_key.expose_secret())
            .header("X-Pinecone-API-Version", &self.api_version)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, VectorIndexRepositoryError> {
        self.authenticated(request)
            .send()
            .await
            .map_err(|e| VectorIndexRepositoryError::RequestError {
                operation,
                message: e.to_string(),
            })
    }

    /// The configured host override, when not empty, wins over the one the control plane reports
    fn handle_from(
        &self,
        description: IndexDescription,
    ) -> Result<IndexHandle, VectorIndexRepositoryError> {
        let host = self
            .index_host
            .clone()
            .filter(|host| !host.is_empty())
            .or(description.host)
            .filter(|host| !host.is_empty())
            .ok_or_else(|| VectorIndexRepositoryError::MissingHost(self.index_name.clone()))?;

        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };

        Ok(IndexHandle { host })
    }
}

async fn api_error(operation: &'static str, response: Response) -> VectorIndexRepositoryError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    VectorIndexRepositoryError::ApiError {
        operation,
        status,
        body,
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    operation: &'static str,
    response: Response,
) -> Result<T, VectorIndexRepositoryError> {
    response
        .json()
        .await
        .map_err(|e| VectorIndexRepositoryError::RequestError {
            operation,
            message: e.to_string(),
        })
}

#[async_trait]
impl VectorIndexRepository for VectorIndexPineconeRepository {
    fn dimension(&self) -> usize {
        self.dimension
    }

    #[tracing::instrument(name = "Describing Pinecone index", skip(self), fields(index = %self.index_name))]
    async fn describe_index(&self) -> Result<IndexStatus, VectorIndexRepositoryError> {
        const OPERATION: &str = "describe the index";

        let url = format!("{}/indexes/{}", self.control_plane_url, self.index_name);
        let response = self.send(OPERATION, self.client.get(url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(IndexStatus::Absent),
            status if status.is_success() => {
                let description: IndexDescription = parse_json(OPERATION, response).await?;
                Ok(IndexStatus::Exists(self.handle_from(description)?))
            }
            _ => Err(api_error(OPERATION, response).await),
        }
    }

    #[tracing::instrument(name = "Creating Pinecone index", skip(self), fields(index = %self.index_name))]
    async fn create_index(&self) -> Result<IndexHandle, VectorIndexRepositoryError> {
        const OPERATION: &str = "create the index";

        let body = json!({
            "name": self.index_name,
            "dimension": self.dimension,
            "metric": self.metric,
            "spec": {
                "serverless": { "cloud": self.cloud, "region": self.region }
            }
        });

        let url = format!("{}/indexes", self.control_plane_url);
        let response = self.send(OPERATION, self.client.post(url).json(&body)).await?;

        match response.status() {
            StatusCode::CONFLICT => {
                // Created in between by another request
                warn!("Index already exists");
                match self.describe_index().await? {
                    IndexStatus::Exists(index) => Ok(index),
                    IndexStatus::Absent => {
                        Err(VectorIndexRepositoryError::MissingHost(self.index_name.clone()))
                    }
                }
            }
            status if status.is_success() => {
                let description: IndexDescription = parse_json(OPERATION, response).await?;
                info!("Index created");
                self.handle_from(description)
            }
            _ => Err(api_error(OPERATION, response).await),
        }
    }

    #[tracing::instrument(name = "Upserting content item to Pinecone", skip(self, item), fields(id = %item.id))]
    async fn upsert(
        &self,
        index: &IndexHandle,
        item: &ContentItem,
    ) -> Result<(), VectorIndexRepositoryError> {
        const OPERATION: &str = "upsert a vector";

        let body = UpsertRequest {
            vectors: [VectorRecord {
                id: item.id.to_string(),
                values: &item.embedding,
                metadata: &item.metadata,
            }],
        };

        let url = format!("{}/vectors/upsert", index.host);
        let response = self.send(OPERATION, self.client.post(url).json(&body)).await?;

        if !response.status().is_success() {
            return Err(api_error(OPERATION, response).await);
        }

        info!("Upserted content item");
        Ok(())
    }

    #[tracing::instrument(name = "Querying Pinecone", skip(self, vector))]
    async fn query(
        &self,
        index: &IndexHandle,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, VectorIndexRepositoryError> {
        const OPERATION: &str = "query vectors";

        let body = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };

        let url = format!("{}/query", index.host);
        let response = self.send(OPERATION, self.client.post(url).json(&body)).await?;

        if !response.status().is_success() {
            return Err(api_error(OPERATION, response).await);
        }

        let response: QueryResponse = parse_json(OPERATION, response).await?;

        let matches = response
            .matches
            .into_iter()
            .map(|record| {
                let metadata = record.metadata.and_then(|metadata| {
                    serde_json::from_value::<ContentMetadata>(metadata)
                        .map_err(|error| warn!(id = %record.id, %error, "Unreadable match metadata"))
                        .ok()
                });

                QueryMatch {
                    id: record.id,
                    score: record.score,
                    metadata,
                }
            })
            .collect();

        Ok(matches)
    }
}
