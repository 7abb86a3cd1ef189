pub mod health_check;
pub mod insert_vector;
pub mod pages;
pub mod query_vector;

pub use health_check::*;
pub use insert_vector::*;
pub use query_vector::*;

use actix_web::{error::InternalError, web, HttpResponse};
use serde_json::json;

/// JSON body of every API error response
pub fn error_body(message: impl std::fmt::Display) -> serde_json::Value {
    json!({ "error": message.to_string() })
}

/// Rejects malformed JSON bodies with a `400 { error }` instead of actix-web's plain text response
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|error, _request| {
        let response = HttpResponse::BadRequest().json(error_body(&error));
        InternalError::from_response(error, response).into()
    })
}
