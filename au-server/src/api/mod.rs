//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - `POST /upload`: accept a multipart file upload under the `file` part
//! - `POST /query`: answer a JSON `{"query": ...}` request
//!
//! When docs are enabled the OpenAPI document is served at `/openapi.json` and an interactive
//! reference at `/docs`.

pub mod handlers;
pub mod models;
