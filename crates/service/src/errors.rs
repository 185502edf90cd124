use thiserror::Error;

use crate::auth::errors::AuthError;
use crate::blob::BlobError;

/// Service-layer error taxonomy.
///
/// `CounterUpdate` never crosses a public service boundary: it is logged and
/// dropped wherever a download counter is bumped.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(#[from] BlobError),
    #[error("counter update failed: {0}")]
    CounterUpdate(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn stale_revision(expected: u64, current: u64) -> Self {
        Self::Conflict(format!("resource was modified (revision {current}, edit based on {expected})"))
    }

    /// Whether the caller sent bad input (either layer's validation).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Model(models::errors::ModelError::Validation(_)))
    }
}
