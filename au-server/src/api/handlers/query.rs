//! HTTP handler for text queries.

use axum::{Json, extract::rejection::JsonRejection};

use crate::api::models::query::{QueryRequest, QueryResponse};
use crate::errors::{ErrorBody, Result};
use crate::facade;

#[utoipa::path(
    post,
    path = "/query",
    tag = "query",
    summary = "Query",
    description = "Ask a question about the uploaded documents. Currently answers with a mock response that echoes the query.",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Query answered", body = QueryResponse),
        (status = 400, description = "Malformed JSON body", body = ErrorBody),
        (status = 415, description = "Body is not sent as application/json", body = ErrorBody),
        (status = 422, description = "Body is missing the `query` field or it is not a string", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn submit_query(payload: std::result::Result<Json<QueryRequest>, JsonRejection>) -> Result<Json<QueryResponse>> {
    let Json(request) = payload?;
    Ok(Json(facade::submit_query(request)))
}
