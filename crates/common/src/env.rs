//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::info;

/// Create the document-store and blob directories if they are missing.
pub async fn ensure_env(data_dir: &str, blob_root: &str) -> anyhow::Result<()> {
    for dir in [data_dir, blob_root] {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {dir}: {e}"))?;
    }
    info!(%data_dir, %blob_root, "runtime directories ready");
    Ok(())
}
