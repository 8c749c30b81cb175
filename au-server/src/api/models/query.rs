use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"query": "hello"}))]
pub struct QueryRequest {
    /// Free text. Empty strings are accepted.
    pub query: String,
}

/// Response of `POST /query`.
///
/// `data` is always present in the JSON, serialized as `null` when there is nothing to attach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "answer": "I received your query: 'hello'. This is a mock response from the server.",
    "data": [{"example": "data"}]
}))]
pub struct QueryResponse {
    pub answer: String,
    #[schema(value_type = Option<Vec<Object>>)]
    pub data: Option<Vec<Map<String, Value>>>,
}
