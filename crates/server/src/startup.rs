use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::ServerState;
use service::Services;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Router over already-assembled services.
pub fn build_app(services: Services, cfg: &AppConfig) -> Router {
    let state = ServerState::new(services).with_secure_cookies(cfg.server.secure_cookies);
    routes::build_router(state, build_cors())
}

/// Public entry: open storage, build the app and serve until `shutdown` resolves.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let services = Services::from_config(&cfg).await?;

    if let Some(admin_addr) = &cfg.server.admin_addr {
        common::admin_http::spawn_admin_server(admin_addr, service::metrics::encode_metrics).await?;
    }

    let app = build_app(services, &cfg);
    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, backend = ?cfg.storage.backend, "resource library listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("http server drained");
    Ok(())
}
