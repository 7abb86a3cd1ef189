use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::helper::error_chain_fmt;

pub type Embeddings = Vec<f32>;

/// A piece of marketing content as stored in the vector index
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub id: Uuid,
    pub embedding: Embeddings,
    pub metadata: ContentMetadata,
}

/// Metadata stored alongside each vector, and returned by searches.
///
/// Decoding is lenient: records written by other clients of the same index
/// may lack any of those fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ContentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub content: String,
    /// ISO 8601 date, `YYYY-MM-DD` or an RFC 3339 datetime, stored as submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Content validated and ready to be embedded
#[derive(Debug, Clone)]
pub struct NewContent {
    /// The text the embedding is computed from
    pub text: String,
    pub metadata: ContentMetadata,
}

impl NewContent {
    /// Validates a submission.
    ///
    /// The title is folded into the metadata, unless the metadata already carries one.
    /// Empty optional fields are dropped so they are not stored as empty strings.
    pub fn parse(
        title: Option<String>,
        text: Option<String>,
        metadata: Option<ContentMetadata>,
    ) -> Result<Self, NewContentError> {
        let (text, mut metadata) = match (text, metadata) {
            (Some(text), Some(metadata)) if !text.trim().is_empty() => (text, metadata),
            _ => return Err(NewContentError::MissingFields),
        };

        metadata.title = non_empty(metadata.title).or_else(|| non_empty(title));
        metadata.author = non_empty(metadata.author);
        metadata.date = non_empty(metadata.date);

        if let Some(date) = &metadata.date {
            if !is_iso_date(date) {
                return Err(NewContentError::InvalidDate(date.clone()));
            }
        }

        Ok(Self { text, metadata })
    }

    pub fn into_item(self, embedding: Embeddings) -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            embedding,
            metadata: self.metadata,
        }
    }
}

/// Calendar date (`2024-03-15`) or datetime as serialised by browsers (`2024-03-15T00:00:00.000Z`)
fn is_iso_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(thiserror::Error)]
pub enum NewContentError {
    #[error("Content and metadata are required")]
    MissingFields,
    #[error("Invalid date {0}, expected an ISO 8601 date (YYYY-MM-DD)")]
    InvalidDate(String),
}

impl std::fmt::Debug for NewContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
