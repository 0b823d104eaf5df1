//! REST API types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

use crate::error::ServerResult;
use crate::transform::{build_document, output_path_for, write_document};

/// Response sent after a matrix upload was converted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    /// Always "ok"; failures use [`error_response`]
    pub status: String,

    /// Name of the uploaded file, if the client sent one
    pub file_name: Option<String>,

    /// Suggested name for the ITK file
    pub output_name: String,

    /// Number of transforms in the document
    pub transform_count: usize,

    /// The ITK transform file contents
    pub document: String,
}

/// Convert an uploaded matrix into a response.
///
/// `suffix` names the suggested output file, as for files on disk.
pub fn convert_upload(
    bytes: &[u8],
    file_name: Option<String>,
    suffix: &str,
) -> ServerResult<ConvertResponse> {
    let text = String::from_utf8_lossy(bytes);
    let document = build_document(&text)?;
    let rendered = write_document(&document)?;

    let source = file_name.as_deref().unwrap_or("matrix.1D");
    let output_name = output_path_for(Path::new(source), Path::new(""), suffix)
        .to_string_lossy()
        .into_owned();

    Ok(ConvertResponse {
        status: "ok".to_string(),
        file_name,
        output_name,
        transform_count: document.len(),
        document: rendered,
    })
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
        "transformCount": 0,
    })
}
