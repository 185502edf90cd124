//! Lead capture and signup export.

pub mod domain;
pub mod export;
pub mod repo;
pub mod repository;
pub mod service;

pub use domain::{Lead, LeadInput};
pub use export::CsvExport;
pub use repository::{JsonLeadRepository, LeadRepository};
pub use service::LeadService;
