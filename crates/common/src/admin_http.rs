//! Lightweight admin HTTP listener
//!
//! Exposes `/healthz` and `/metrics` on a separate port, with metrics provided by caller.

use axum::http::StatusCode;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub type MetricsFn = fn() -> (StatusCode, String);

async fn healthz() -> &'static str { "OK" }

pub fn admin_router(metrics_fn: MetricsFn) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(move || async move { metrics_fn() }))
}

/// Bind `addr` and serve the admin router on the current runtime.
/// Bind failures are returned; serve failures are logged from the spawned task.
pub async fn spawn_admin_server(addr: &str, metrics_fn: MetricsFn) -> anyhow::Result<JoinHandle<()>> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "admin server listening");
    let router = admin_router(metrics_fn);
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "admin server stopped");
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::Service;

    fn fake_metrics() -> (StatusCode, String) {
        (StatusCode::OK, "library_up 1\n".to_string())
    }

    #[tokio::test]
    async fn serves_metrics_from_callback() -> anyhow::Result<()> {
        let mut app = admin_router(fake_metrics);
        let resp = app.call(Request::builder().uri("/metrics").body(Body::empty())?).await?;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
        assert_eq!(&body[..], b"library_up 1\n");

        let resp = app.call(Request::builder().uri("/healthz").body(Body::empty())?).await?;
        assert_eq!(resp.status(), StatusCode::OK);
        Ok(())
    }
}
