use axum::{extract::{Request, State}, http::header, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;

use crate::errors::JsonApiError;
use crate::state::ServerState;

pub const ADMIN_COOKIE: &str = "admin_token";

/// Admin token from `Authorization: Bearer`, falling back to the `admin_token` cookie.
pub fn bearer_or_cookie(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(h) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return h.strip_prefix("Bearer ").map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    }
    CookieJar::from_headers(headers)
        .get(ADMIN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Route layer for admin endpoints: verifies the session and stores the
/// `AdminIdentity` in request extensions.
pub async fn require_admin(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    let Some(token) = bearer_or_cookie(req.headers()) else {
        tracing::warn!(path = %path, "missing admin token");
        return Err(JsonApiError::unauthorized("admin login required"));
    };
    match state.auth.verify(&token).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "admin token rejected");
            Err(e.into())
        }
    }
}
