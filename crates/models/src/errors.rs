use thiserror::Error;

/// Failures raised while validating or persisting catalog rows.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    /// A stored value that no longer decodes, e.g. a hand-edited tags column.
    #[error("corrupt {column} column: {reason}")]
    CorruptColumn { column: &'static str, reason: String },
}
