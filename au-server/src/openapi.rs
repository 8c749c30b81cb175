//! OpenAPI document for the public endpoints, served at `/openapi.json` with an interactive
//! reference at `/docs` when `enable_docs` is set.

use utoipa::OpenApi;

use crate::api::handlers;
use crate::api::models::{
    query::{QueryRequest, QueryResponse},
    upload::UploadResponse,
};
use crate::errors::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    info(title = "au-server", description = "Upload documents and query them."),
    paths(handlers::upload::upload_file, handlers::query::submit_query),
    components(schemas(QueryRequest, QueryResponse, UploadResponse, ErrorBody)),
    tags(
        (name = "files", description = "Document uploads"),
        (name = "query", description = "Questions about uploaded documents"),
    )
)]
pub struct ApiDoc;
