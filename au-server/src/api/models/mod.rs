//! API request and response data models.
//!
//! These types are the public wire contract of the service. Field names and optionality match
//! what the frontend sends and expects byte for byte, so renaming anything here is a breaking
//! change.
//!
//! - [`query`]: `/query` request and response bodies
//! - [`upload`]: `/upload` response body and the metadata read from the uploaded part

pub mod query;
pub mod upload;
