use axum::{extract::State, http::{HeaderMap, StatusCode}, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use service::auth::domain::{AdminIdentity, AdminSession, ChangePasswordInput, LoginInput};

use crate::auth::{bearer_or_cookie, ADMIN_COOKIE};
use crate::errors::JsonApiError;
use crate::state::ServerState;

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In", body = crate::openapi::AdminSessionDoc), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<AdminSession>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let mut cookie = Cookie::new(ADMIN_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(state.secure_cookies);
    cookie.set_same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(session)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Logged out")))]
pub async fn logout(
    State(state): State<ServerState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), JsonApiError> {
    if let Some(token) = bearer_or_cookie(&headers) {
        state.auth.logout(&token).await?;
    }
    let mut removal = Cookie::from(ADMIN_COOKIE);
    removal.set_path("/");
    Ok((jar.remove(removal), StatusCode::NO_CONTENT))
}

#[utoipa::path(post, path = "/auth/password", tag = "auth", request_body = crate::openapi::ChangePasswordRequest, responses((status = 204, description = "Password changed"), (status = 400, description = "Password too short"), (status = 401, description = "Unauthorized")))]
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(identity): Extension<AdminIdentity>,
    Json(input): Json<ChangePasswordInput>,
) -> Result<StatusCode, JsonApiError> {
    state.auth.change_password(&identity, input).await?;
    Ok(StatusCode::NO_CONTENT)
}
