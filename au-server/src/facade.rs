//! The two operations the service offers, independent of HTTP.
//!
//! Both are placeholders for a document-query backend: an upload is acknowledged and discarded,
//! and a query is echoed back in a fixed template together with a static example payload.
//! Neither can fail and neither keeps any state between calls.

use serde_json::{Map, Value};
use tracing::info;

use crate::api::models::query::{QueryRequest, QueryResponse};
use crate::api::models::upload::{UploadResponse, UploadedFile};

/// Acknowledge an uploaded file.
pub fn submit_file(file: &UploadedFile) -> UploadResponse {
    info!(
        filename = %file.filename,
        content_type = file.content_type.as_deref().unwrap_or("unknown"),
        size = file.size,
        "Received file"
    );

    UploadResponse {
        message: format!("File {} uploaded successfully", file.filename),
    }
}

/// Answer a query with the mock response.
pub fn submit_query(request: QueryRequest) -> QueryResponse {
    info!(query = %request.query, "Received query");

    QueryResponse {
        answer: format!("I received your query: '{}'. This is a mock response from the server.", request.query),
        data: Some(example_data()),
    }
}

fn example_data() -> Vec<Map<String, Value>> {
    let mut row = Map::new();
    row.insert("example".to_string(), Value::String("data".to_string()));
    vec![row]
}
