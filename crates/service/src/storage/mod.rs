//! Storage abstractions for service layer
//!
//! Contains the file-backed document map used by the JSON repositories and
//! the append-only JSON lines log behind the lead store.

pub mod json_lines_log;
pub mod json_map_store;
