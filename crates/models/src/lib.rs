//! Persistence models shared by the service and server crates.
//! - SeaORM entities for the Postgres backend.
//! - Catalog enums (`kinds`) with their wire names.
//! - Field validation reused by every storage backend.

pub mod errors;
pub mod db;
pub mod kinds;
pub mod resource;
pub mod lead;
pub mod admin_credentials;
