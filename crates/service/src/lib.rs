//! Service layer: catalog, lead capture, downloads and admin auth.
//! - Repositories hide the storage backend (JSON document files or Postgres).
//! - Reuses validation and entity definitions in `models` crate.
//! - Services own the orchestration and the error taxonomy.

pub mod errors;
pub mod auth;
pub mod blob;
pub mod catalog;
pub mod downloads;
pub mod leads;
pub mod metrics;
pub mod runtime;
pub mod storage;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
pub use runtime::Services;
