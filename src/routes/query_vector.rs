use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    domain::entities::content_item::ContentMetadata,
    helper::error_chain_fmt,
    routes::error_body,
    use_cases::query_content::{QueryContentError, QueryContentRequest, QueryContentUseCase},
};

#[tracing::instrument(name = "Query vector handler", skip(use_case, body), fields(top_k = ?body.top_k))]
pub async fn query_vector(
    use_case: web::Data<QueryContentUseCase>,
    body: web::Json<QueryVectorBodyData>,
) -> Result<HttpResponse, QueryVectorError> {
    let QueryVectorBodyData {
        message_content,
        top_k,
    } = body.into_inner();

    let retrieved_data = use_case
        .execute(QueryContentRequest {
            text: message_content,
            top_k,
        })
        .await?;

    info!(nb_results = retrieved_data.len(), "Vectors queried");
    Ok(HttpResponse::Ok().json(QueryVectorResponseData { retrieved_data }))
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct QueryVectorBodyData {
    #[serde(default)]
    pub message_content: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QueryVectorResponseData {
    #[serde(rename = "retrievedData")]
    pub retrieved_data: Vec<ContentMetadata>,
}

#[derive(thiserror::Error)]
pub enum QueryVectorError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    InternalError(QueryContentError),
}

impl From<QueryContentError> for QueryVectorError {
    fn from(error: QueryContentError) -> Self {
        match error {
            QueryContentError::InvalidQuery(e) => Self::InvalidInput(e.to_string()),
            other => Self::InternalError(other),
        }
    }
}

impl std::fmt::Debug for QueryVectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for QueryVectorError {
    fn status_code(&self) -> StatusCode {
        match self {
            QueryVectorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            QueryVectorError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from query_vector route", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(error_body(self))
    }
}
