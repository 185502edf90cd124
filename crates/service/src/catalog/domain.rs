use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use models::kinds::{Category, ResourceType, Tag};
use serde::{Deserialize, Deserializer, Serialize};

use super::visibility::PublicationStatus;

/// A catalog entry as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub category: Category,
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub file_name: String,
    pub download_count: u64,
    #[serde(default)]
    pub is_coming_soon: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub live_date: Option<DateTime<Utc>>,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    pub fn status_at(&self, now: DateTime<Utc>) -> PublicationStatus {
        PublicationStatus::of(self, now)
    }

    pub fn is_publicly_visible(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == PublicationStatus::Live
    }

    /// The shape shown to visitors: coming-soon entries carry no download link.
    pub fn into_public_view(mut self) -> Self {
        if self.is_coming_soon {
            self.file_url.clear();
        }
        self
    }

    /// Download link a visitor may follow, if any.
    pub fn download_link(&self) -> Option<&str> {
        if self.is_coming_soon || self.file_url.is_empty() {
            None
        } else {
            Some(self.file_url.as_str())
        }
    }
}

/// Admin input for a new resource. `imageUrl`/`fileUrl` may be plain URLs
/// or base64 data URIs, which are uploaded before the record is written.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub category: Category,
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub is_coming_soon: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub live_date: Option<DateTime<Utc>>,
}

/// Partial admin edit. Absent fields are left untouched; `liveDate: null`
/// clears the schedule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<ResourceType>,
    pub category: Option<Category>,
    pub tags: Option<BTreeSet<Tag>>,
    pub image_url: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub is_coming_soon: Option<bool>,
    pub is_hidden: Option<bool>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub live_date: Option<Option<DateTime<Utc>>>,
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ResourcePatch {
    /// Copy the present fields onto `resource`. Identity, counter and
    /// bookkeeping fields are not part of a patch.
    pub fn apply(&self, resource: &mut Resource) {
        if let Some(v) = &self.title {
            resource.title = v.trim().to_string();
        }
        if let Some(v) = &self.description {
            resource.description = v.clone();
        }
        if let Some(v) = &self.long_description {
            resource.long_description = v.clone();
        }
        if let Some(v) = self.resource_type {
            resource.resource_type = v;
        }
        if let Some(v) = self.category {
            resource.category = v;
        }
        if let Some(v) = &self.tags {
            resource.tags = v.clone();
        }
        if let Some(v) = &self.image_url {
            resource.image_url = v.clone();
        }
        if let Some(v) = &self.file_url {
            resource.file_url = v.clone();
        }
        if let Some(v) = &self.file_name {
            resource.file_name = v.trim().to_string();
        }
        if let Some(v) = self.is_coming_soon {
            resource.is_coming_soon = v;
        }
        if let Some(v) = self.is_hidden {
            resource.is_hidden = v;
        }
        if let Some(v) = self.live_date {
            resource.live_date = v;
        }
    }
}

/// Admin listing row: the full record plus its current publication status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResource {
    #[serde(flatten)]
    pub resource: Resource,
    pub status: PublicationStatus,
}
