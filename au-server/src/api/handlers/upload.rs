//! HTTP handler for file uploads.

use axum::{
    Json,
    extract::{Multipart, multipart::MultipartRejection},
    http::StatusCode,
};

use crate::api::models::upload::{UploadResponse, UploadedFile};
use crate::errors::{Error, ErrorBody, Result};
use crate::facade;

/// Name of the multipart part carrying the file.
const FILE_FIELD: &str = "file";

#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    summary = "Upload file",
    description = "Upload a document under the `file` part. The file is acknowledged and discarded; nothing is stored.",
    request_body(
        content_type = "multipart/form-data",
        description = "Multipart form with the document in a part named `file`"
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "Body is not valid multipart data", body = ErrorBody),
        (status = 413, description = "Payload too large", body = ErrorBody),
        (status = 422, description = "No `file` part, or `file` is not a file", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn upload_file(multipart: std::result::Result<Multipart, MultipartRejection>) -> Result<(StatusCode, Json<UploadResponse>)> {
    let file = receive_file(multipart?).await?;
    Ok((StatusCode::CREATED, Json(facade::submit_file(&file))))
}

/// Drain the first `file` part of the form, counting its bytes. Other parts are skipped.
async fn receive_file(mut multipart: Multipart) -> Result<UploadedFile> {
    let mut uploaded: Option<UploadedFile> = None;

    // Unread fields are skipped by the parser when the next one is requested
    while let Some(mut field) = multipart.next_field().await? {
        if uploaded.is_some() || field.name() != Some(FILE_FIELD) {
            tracing::debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }

        let filename = field.file_name().map(str::to_string).ok_or_else(|| Error::Unprocessable {
            message: format!("Field '{FILE_FIELD}' must be a file upload, got a plain form value"),
        })?;
        let content_type = field.content_type().map(str::to_string);

        tracing::debug!(filename = %filename, "Starting file upload stream");

        let mut size = 0u64;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
            tracing::trace!(chunk_size = chunk.len(), total_size = size, "Discarded chunk");
        }

        uploaded = Some(UploadedFile {
            filename,
            content_type,
            size,
        });
    }

    uploaded.ok_or_else(|| Error::Unprocessable {
        message: format!("Missing required field: '{FILE_FIELD}'"),
    })
}
