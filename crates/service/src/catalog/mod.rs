//! Resource catalog: records, publication rules and the admin lifecycle.

pub mod domain;
pub mod repo;
pub mod repository;
pub mod service;
pub mod visibility;

pub use domain::{AdminResource, NewResource, Resource, ResourcePatch};
pub use repository::{CatalogRepository, JsonCatalogRepository};
pub use service::CatalogService;
pub use visibility::{CatalogQuery, PublicationStatus};
