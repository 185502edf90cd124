use axum::{body::Bytes, extract::{Path, State}, http::{HeaderMap, StatusCode}, Json};
use chrono::Utc;
use serde::Deserialize;
use service::downloads::{DownloadIdentity, DownloadOutcome, SubscriberPass};
use service::leads::LeadInput;

use crate::errors::JsonApiError;
use crate::state::ServerState;

pub const SUBSCRIBER_PASS_HEADER: &str = "x-subscriber-pass";

fn identity_from(headers: &HeaderMap, body: &Bytes) -> Result<DownloadIdentity, JsonApiError> {
    if let Some(pass) = headers.get(SUBSCRIBER_PASS_HEADER).and_then(|v| v.to_str().ok()) {
        if !pass.trim().is_empty() {
            return Ok(DownloadIdentity::Subscriber(pass.trim().to_string()));
        }
    }
    if body.is_empty() {
        return Err(JsonApiError::bad_request("signup form or subscriber pass required"));
    }
    let input: LeadInput = serde_json::from_slice(body).map_err(|e| JsonApiError::bad_request(e.to_string()))?;
    Ok(DownloadIdentity::Form(input))
}

#[utoipa::path(post, path = "/api/resources/{id}/downloads", tag = "downloads", params(("id" = String, Path, description = "Resource id"), ("X-Subscriber-Pass" = Option<String>, Header, description = "Pass from an earlier signup")), request_body = Option<crate::openapi::LeadRequest>, responses((status = 200, description = "Lead recorded", body = crate::openapi::DownloadOutcomeDoc), (status = 400, description = "Invalid form"), (status = 401, description = "Invalid pass"), (status = 404, description = "Resource not available")))]
pub async fn submit_download(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DownloadOutcome>, JsonApiError> {
    let identity = identity_from(&headers, &body)?;
    state
        .downloads
        .submit(&id, identity, Utc::now())
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("resource not found"))
}

#[utoipa::path(post, path = "/api/resources/{id}/external-access", tag = "downloads", params(("id" = String, Path, description = "Resource id")), responses((status = 204, description = "Counted"), (status = 404, description = "Resource not available")))]
pub async fn record_external_access(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    if state.downloads.record_external_access(&id, Utc::now()).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("resource not found"))
    }
}

#[derive(Debug, Deserialize)]
pub struct PassRequest {
    pub email: String,
}

#[utoipa::path(post, path = "/api/subscribers/pass", tag = "downloads", request_body = crate::openapi::PassRequestDoc, responses((status = 200, description = "Pass issued", body = crate::openapi::SubscriberPassDoc), (status = 400, description = "Invalid email")))]
pub async fn issue_pass(
    State(state): State<ServerState>,
    Json(input): Json<PassRequest>,
) -> Result<Json<SubscriberPass>, JsonApiError> {
    Ok(Json(state.downloads.issue_pass(&input.email)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn pass_header_wins_over_body() {
        let mut h = HeaderMap::new();
        h.insert(SUBSCRIBER_PASS_HEADER, HeaderValue::from_static("tok"));
        let body = Bytes::from_static(br#"{"firstName":"Jo","email":"jo@example.com","hasConsented":true}"#);
        assert!(matches!(identity_from(&h, &body), Ok(DownloadIdentity::Subscriber(t)) if t == "tok"));
        assert!(matches!(identity_from(&HeaderMap::new(), &body), Ok(DownloadIdentity::Form(_))));
        assert!(identity_from(&HeaderMap::new(), &Bytes::new()).is_err());
        assert!(identity_from(&HeaderMap::new(), &Bytes::from_static(b"{")).is_err());
    }
}
