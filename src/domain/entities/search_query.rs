use crate::helper::error_chain_fmt;

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub top_k: usize,
}

impl SearchQuery {
    /// `top_k` falls back to `DEFAULT_TOP_K` when omitted or zero
    pub fn parse(text: Option<String>, top_k: Option<usize>) -> Result<Self, SearchQueryError> {
        let text = match text {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(SearchQueryError::MissingText),
        };

        let top_k = match top_k {
            Some(top_k) if top_k > 0 => top_k,
            _ => DEFAULT_TOP_K,
        };

        Ok(Self { text, top_k })
    }
}

#[derive(thiserror::Error)]
pub enum SearchQueryError {
    #[error("message_content is required")]
    MissingText,
}

impl std::fmt::Debug for SearchQueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
