use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use service::blob::BlobContent;
use service::catalog::{AdminResource, NewResource, Resource, ResourcePatch};
use service::leads::Lead;
use tracing::info;

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[utoipa::path(get, path = "/admin/resources", tag = "admin", responses((status = 200, description = "All resources with publication status", body = [crate::openapi::AdminResourceDoc]), (status = 401, description = "Unauthorized")))]
pub async fn list_resources(State(state): State<ServerState>) -> Result<Json<Vec<AdminResource>>, JsonApiError> {
    Ok(Json(state.catalog.list_admin(Utc::now()).await?))
}

#[utoipa::path(post, path = "/admin/resources", tag = "admin", request_body = crate::openapi::NewResourceDoc, responses((status = 201, description = "Created", body = crate::openapi::ResourceDoc), (status = 400, description = "Bad Request"), (status = 502, description = "Upload failed")))]
pub async fn create_resource(
    State(state): State<ServerState>,
    Json(input): Json<NewResource>,
) -> Result<(StatusCode, Json<Resource>), JsonApiError> {
    let created = state.catalog.create(input, None, None).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Edit body: the revision the edit is based on plus the changed fields.
#[derive(Debug, Deserialize)]
pub struct UpdateResourceRequest {
    pub revision: u64,
    #[serde(flatten)]
    pub patch: ResourcePatch,
}

#[utoipa::path(put, path = "/admin/resources/{id}", tag = "admin", params(("id" = String, Path, description = "Resource id")), request_body = crate::openapi::UpdateResourceDoc, responses((status = 200, description = "Updated", body = crate::openapi::ResourceDoc), (status = 404, description = "Not found"), (status = 409, description = "Edited since the given revision")))]
pub async fn update_resource(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateResourceRequest>,
) -> Result<Json<Resource>, JsonApiError> {
    let updated = state.catalog.update(&id, input.revision, input.patch, None, None).await?;
    Ok(Json(updated))
}

#[utoipa::path(delete, path = "/admin/resources/{id}", tag = "admin", params(("id" = String, Path, description = "Resource id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete_resource(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    state.catalog.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadParams {
    /// Download name, also the last path segment of the stored file.
    pub file_name: String,
    /// Revision the upload is based on.
    pub revision: u64,
}

#[utoipa::path(put, path = "/admin/resources/{id}/file", tag = "admin", params(("id" = String, Path, description = "Resource id"), FileUploadParams), request_body(content = Vec<u8>, content_type = "application/octet-stream"), responses((status = 200, description = "File replaced", body = crate::openapi::ResourceDoc), (status = 400, description = "Bad Request"), (status = 409, description = "Edited since the given revision")))]
pub async fn upload_file(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(params): Query<FileUploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Resource>, JsonApiError> {
    if body.is_empty() {
        return Err(JsonApiError::bad_request("file body is empty"));
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let size = body.len();
    let content = BlobContent::bytes(body.to_vec(), content_type);
    let updated = state.catalog.replace_file(&id, params.revision, &params.file_name, content).await?;
    info!(resource_id = %id, size_bytes = size, "resource_file_uploaded");
    Ok(Json(updated))
}

#[utoipa::path(get, path = "/admin/leads", tag = "admin", responses((status = 200, description = "All leads, oldest first", body = [crate::openapi::LeadDoc])))]
pub async fn list_leads(State(state): State<ServerState>) -> Result<Json<Vec<Lead>>, JsonApiError> {
    Ok(Json(state.leads.list().await?))
}

#[utoipa::path(get, path = "/admin/resources/{id}/signups.csv", tag = "admin", params(("id" = String, Path, description = "Resource id")), responses((status = 200, description = "CSV file", content_type = "text/csv"), (status = 204, description = "No signups yet"), (status = 404, description = "Not found")))]
pub async fn export_signups(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Response, JsonApiError> {
    let resource = state
        .catalog
        .get(&id)
        .await?
        .ok_or_else(|| JsonApiError::not_found("resource not found"))?;
    let Some(csv) = state.leads.export_csv(&resource).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let disposition = format!("attachment; filename=\"{}\"", csv.filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv.content,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_flattens_patch() {
        let raw = r#"{"revision": 3, "title": "New", "liveDate": null, "type": "PDF"}"#;
        let req: UpdateResourceRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.revision, 3);
        assert_eq!(req.patch.title.as_deref(), Some("New"));
        assert_eq!(req.patch.live_date, Some(None));
        assert!(req.patch.resource_type.is_some());
        assert!(req.patch.description.is_none());
    }
}
