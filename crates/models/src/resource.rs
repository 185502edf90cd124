use std::collections::BTreeSet;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::kinds::Tag;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resource")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub long_description: String,
    pub resource_type: String,
    pub category: String,
    /// JSON array of tag display names, see [`encode_tags`].
    #[sea_orm(column_type = "Text")]
    pub tags: String,
    #[sea_orm(column_type = "Text")]
    pub image_url: String,
    #[sea_orm(column_type = "Text")]
    pub file_url: String,
    pub file_name: String,
    pub download_count: i64,
    pub is_coming_soon: bool,
    pub is_hidden: bool,
    pub live_date: Option<DateTimeWithTimeZone>,
    pub revision: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    if title.trim().is_empty() {
        return Err(ModelError::Validation("title is required".into()));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ModelError> {
    if description.trim().is_empty() {
        return Err(ModelError::Validation("description is required".into()));
    }
    Ok(())
}

/// File names become the last segment of a blob path, so they must be a single plain segment.
pub fn validate_file_name(name: &str) -> Result<(), ModelError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ModelError::Validation("fileName is required when uploading a file".into()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ModelError::Validation("fileName must not contain path separators".into()));
    }
    Ok(())
}

pub fn encode_tags<'a>(tags: impl IntoIterator<Item = &'a Tag>) -> String {
    let names: Vec<&str> = tags.into_iter().map(|t| t.as_str()).collect();
    serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
}

pub fn decode_tags(raw: &str) -> Result<BTreeSet<Tag>, ModelError> {
    if raw.trim().is_empty() {
        return Ok(BTreeSet::new());
    }
    serde_json::from_str(raw).map_err(|e| ModelError::CorruptColumn { column: "tags", reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_description_are_required() {
        assert!(validate_title("Budget Sheet").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_description("").is_err());
    }

    #[test]
    fn file_name_must_be_single_segment() {
        assert!(validate_file_name("budget.xlsx").is_ok());
        assert!(validate_file_name("../etc/passwd").is_err());
        assert!(validate_file_name("a/b.pdf").is_err());
        assert!(validate_file_name("").is_err());
    }

    #[test]
    fn tags_column_codec() {
        let tags: BTreeSet<Tag> = [Tag::Families, Tag::Calculators].into_iter().collect();
        let raw = encode_tags(&tags);
        assert_eq!(decode_tags(&raw).unwrap(), tags);
        assert!(decode_tags("").unwrap().is_empty());
        assert!(matches!(decode_tags("not json"), Err(ModelError::CorruptColumn { column: "tags", .. })));
    }
}
