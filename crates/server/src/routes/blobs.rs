use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use service::blob::BlobError;

use crate::errors::JsonApiError;
use crate::state::ServerState;

/// Serve a stored blob with its content type and download name.
pub async fn get_blob(State(state): State<ServerState>, Path(path): Path<String>) -> Result<Response, JsonApiError> {
    let blob = match state.catalog.blobs().fetch(&path).await {
        Ok(blob) => blob,
        Err(BlobError::NotFound(_)) | Err(BlobError::InvalidPath(_)) => {
            return Err(JsonApiError::not_found("blob not found"));
        }
        Err(e) => return Err(JsonApiError::new(StatusCode::BAD_GATEWAY, "storage_error", e.to_string())),
    };
    let disposition = format!("attachment; filename=\"{}\"", blob.file_name.replace('"', ""));
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, blob.content_type), (header::CONTENT_DISPOSITION, disposition)],
        blob.data,
    )
        .into_response())
}
