pub mod admin;
pub mod auth;
pub mod blobs;
pub mod catalog;
pub mod downloads;

use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use service::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION};

use crate::openapi::ApiDoc;
use crate::state::ServerState;

/// Inline data URIs and raw file uploads go through request bodies.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let resp = next.run(req).await;
    HTTP_REQUESTS_TOTAL.inc();
    HTTP_REQUEST_DURATION.observe(start.elapsed().as_secs_f64());
    resp
}

/// Build the full application router: public catalog and download routes,
/// auth, and the admin routes behind `require_admin`.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/embed.js", get(crate::embed::embed_js))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/api/resources", get(catalog::list_resources))
        .route("/api/resources/:id", get(catalog::get_resource))
        .route("/api/resources/:id/downloads", post(downloads::submit_download))
        .route("/api/resources/:id/external-access", post(downloads::record_external_access))
        .route("/api/subscribers/pass", post(downloads::issue_pass))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/blobs/*path", get(blobs::get_blob));

    let admin_routes = Router::new()
        .route("/auth/password", post(auth::change_password))
        .route("/admin/resources", get(admin::list_resources).post(admin::create_resource))
        .route("/admin/resources/:id", put(admin::update_resource).delete(admin::delete_resource))
        .route("/admin/resources/:id/file", put(admin::upload_file))
        .route("/admin/resources/:id/signups.csv", get(admin::export_signups))
        .route("/admin/leads", get(admin::list_leads))
        .route_layer(middleware::from_fn_with_state(state.clone(), crate::auth::require_admin));

    public
        .merge(admin_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(track_metrics))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one span per request, method and path included
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
