//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Admin login, session revocation and password rotation live here.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::{AuthConfig, AuthService};
