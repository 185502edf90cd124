use std::collections::BTreeSet;

use axum::{extract::{Path, Query, State}, Json};
use chrono::Utc;
use models::kinds::{Category, Tag};
use service::catalog::{CatalogQuery, Resource};

use crate::errors::JsonApiError;
use crate::state::ServerState;

/// Parse `search`, `category` and repeated `tag` parameters. Tag names may
/// contain commas, so each tag is its own parameter.
pub fn parse_catalog_query(pairs: &[(String, String)]) -> Result<CatalogQuery, JsonApiError> {
    let mut query = CatalogQuery::default();
    let mut tags = BTreeSet::new();
    for (key, value) in pairs {
        match key.as_str() {
            "search" | "q" => query.search = Some(value.clone()),
            "category" if !value.trim().is_empty() => {
                query.category = Some(value.parse::<Category>().map_err(|e| JsonApiError::bad_request(e.to_string()))?);
            }
            "tag" | "tags" if !value.trim().is_empty() => {
                tags.insert(value.parse::<Tag>().map_err(|e| JsonApiError::bad_request(e.to_string()))?);
            }
            _ => {}
        }
    }
    query.tags = tags;
    Ok(query)
}

#[utoipa::path(get, path = "/api/resources", tag = "catalog", params(crate::openapi::CatalogQueryDoc), responses((status = 200, description = "Visible resources, most downloaded first", body = [crate::openapi::ResourceDoc]), (status = 400, description = "Unknown category or tag")))]
pub async fn list_resources(
    State(state): State<ServerState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Resource>>, JsonApiError> {
    let query = parse_catalog_query(&pairs)?;
    let resources = state.catalog.list_public(&query, Utc::now()).await?;
    Ok(Json(resources))
}

#[utoipa::path(get, path = "/api/resources/{id}", tag = "catalog", params(("id" = String, Path, description = "Resource id")), responses((status = 200, description = "Resource", body = crate::openapi::ResourceDoc), (status = 404, description = "Not found or not visible")))]
pub async fn get_resource(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Resource>, JsonApiError> {
    state
        .catalog
        .get_public(&id, Utc::now())
        .await?
        .map(Json)
        .ok_or_else(|| JsonApiError::not_found("resource not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_repeated_tags_with_commas() {
        let q = parse_catalog_query(&pairs(&[
            ("search", "budget"),
            ("category", "Sample Financial Plans"),
            ("tag", "DINK (Dual Income, No Kids)"),
            ("tag", "Families"),
        ]))
        .unwrap();
        assert_eq!(q.search.as_deref(), Some("budget"));
        assert_eq!(q.category, Some(Category::Plans));
        assert_eq!(q.tags.len(), 2);
        assert!(q.tags.contains(&Tag::Dink));
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(parse_catalog_query(&pairs(&[("category", "Nope")])).is_err());
        assert!(parse_catalog_query(&pairs(&[("tag", "Nope")])).is_err());
        assert!(parse_catalog_query(&pairs(&[("category", ""), ("other", "x")])).is_ok());
    }
}
