//! HTTP request handlers for all API endpoints.
//!
//! Handlers only deal with the transport: they extract and check the request shape, hand the
//! typed request to [`crate::facade`], and pick the status code. Extractor rejections are taken
//! as `Result`s and converted into [`crate::errors::Error`] so every client error shares the same
//! `{"detail": ...}` body.
//!
//! - [`query`]: text queries
//! - [`upload`]: file uploads

pub mod query;
pub mod upload;
