use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lead")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub first_name: String,
    pub email: String,
    /// No foreign key: the resource may be deleted later.
    pub resource_id: String,
    pub resource_title: String,
    pub timestamp: DateTimeWithTimeZone,
    pub has_consented: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    if !is_valid_email(email.trim()) {
        return Err(ModelError::Validation("please enter a valid email address".into()));
    }
    Ok(())
}

pub fn validate_first_name(first_name: &str) -> Result<(), ModelError> {
    if first_name.trim().is_empty() {
        return Err(ModelError::Validation("first name is required".into()));
    }
    Ok(())
}
