use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use tracing::info;

use crate::{
    domain::entities::content_item::ContentMetadata,
    helper::error_chain_fmt,
    routes::error_body,
    use_cases::insert_content::{InsertContentError, InsertContentRequest, InsertContentUseCase},
};

#[tracing::instrument(name = "Insert vector handler", skip(use_case, body), fields(title = ?body.title))]
pub async fn insert_vector(
    use_case: web::Data<InsertContentUseCase>,
    body: web::Json<InsertVectorBodyData>,
) -> Result<HttpResponse, InsertVectorError> {
    let InsertVectorBodyData {
        title,
        vector,
        metadata,
    } = body.into_inner();

    let id = use_case
        .execute(InsertContentRequest {
            title,
            text: vector,
            metadata,
        })
        .await?;

    info!(%id, "Vector upserted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Vector upserted successfully", "id": id })))
}

/// `vector` is the raw text to embed
#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct InsertVectorBodyData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub vector: Option<String>,
    #[serde(default)]
    pub metadata: Option<ContentMetadata>,
}

#[derive(thiserror::Error)]
pub enum InsertVectorError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    InternalError(InsertContentError),
}

impl From<InsertContentError> for InsertVectorError {
    fn from(error: InsertContentError) -> Self {
        match error {
            InsertContentError::InvalidContent(e) => Self::InvalidInput(e.to_string()),
            other => Self::InternalError(other),
        }
    }
}

impl std::fmt::Debug for InsertVectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for InsertVectorError {
    fn status_code(&self) -> StatusCode {
        match self {
            InsertVectorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            InsertVectorError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from insert_vector route", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(error_body(self))
    }
}
