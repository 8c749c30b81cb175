use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"message": "File report.pdf uploaded successfully"}))]
pub struct UploadResponse {
    pub message: String,
}

/// Metadata of the `file` part of an upload, collected while its bytes are drained.
///
/// The bytes themselves are never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    /// Content type declared on the part, if any
    pub content_type: Option<String>,
    /// Bytes actually read from the part
    pub size: u64,
}
