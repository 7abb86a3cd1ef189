pub mod insert_content;
pub mod query_content;
