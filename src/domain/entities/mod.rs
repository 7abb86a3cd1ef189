pub mod content_item;
pub mod search_query;
