use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A captured signup. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub first_name: String,
    pub email: String,
    pub resource_id: String,
    /// Title at signup time; not updated if the resource is renamed.
    pub resource_title: String,
    pub timestamp: DateTime<Utc>,
    pub has_consented: bool,
}

/// What the download form submits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadInput {
    pub first_name: String,
    pub email: String,
    #[serde(default)]
    pub has_consented: bool,
}
