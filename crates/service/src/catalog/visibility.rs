//! Publication rules and the public catalog query.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use models::kinds::{Category, Tag};
use serde::Serialize;

use super::domain::Resource;

/// Where a resource sits in its publication lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Hidden,
    /// Not hidden, but `liveDate` is still in the future.
    Scheduled,
    Live,
}

impl PublicationStatus {
    pub fn of(resource: &Resource, now: DateTime<Utc>) -> Self {
        if resource.is_hidden {
            return Self::Hidden;
        }
        match resource.live_date {
            Some(at) if at > now => Self::Scheduled,
            _ => Self::Live,
        }
    }
}

/// Visitor-side filters over the visible catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Case-insensitive substring of the title or description.
    pub search: Option<String>,
    pub category: Option<Category>,
    /// Every listed tag must be present on a match.
    pub tags: BTreeSet<Tag>,
}

impl CatalogQuery {
    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(category) = self.category {
            if resource.category != category {
                return false;
            }
        }
        if !self.tags.is_subset(&resource.tags) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                resource.title.to_lowercase().contains(&term) || resource.description.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }

    /// Visible, matching resources, most downloaded first.
    pub fn apply(&self, resources: Vec<Resource>, now: DateTime<Utc>) -> Vec<Resource> {
        let mut out: Vec<Resource> = resources
            .into_iter()
            .filter(|r| r.is_publicly_visible(now) && self.matches(r))
            .collect();
        out.sort_by(|a, b| b.download_count.cmp(&a.download_count).then_with(|| a.title.cmp(&b.title)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use models::kinds::ResourceType;

    fn resource(title: &str, downloads: u64) -> Resource {
        let now = Utc::now();
        Resource {
            id: title.to_lowercase(),
            title: title.into(),
            description: format!("{title} description"),
            long_description: String::new(),
            resource_type: ResourceType::Pdf,
            category: Category::Toolkit,
            tags: BTreeSet::new(),
            image_url: String::new(),
            file_url: String::new(),
            file_name: String::new(),
            download_count: downloads,
            is_coming_soon: false,
            is_hidden: false,
            live_date: None,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_follows_hidden_flag_and_live_date() {
        let now = Utc::now();
        let mut r = resource("A", 0);
        assert_eq!(PublicationStatus::of(&r, now), PublicationStatus::Live);

        r.live_date = Some(now + Duration::days(1));
        assert_eq!(PublicationStatus::of(&r, now), PublicationStatus::Scheduled);

        r.live_date = Some(now - Duration::days(1));
        assert_eq!(PublicationStatus::of(&r, now), PublicationStatus::Live);

        r.is_hidden = true;
        assert_eq!(PublicationStatus::of(&r, now), PublicationStatus::Hidden);
    }

    #[test]
    fn hidden_and_future_are_excluded() {
        let now = Utc::now();
        let visible = resource("Visible", 1);
        let mut hidden = resource("Hidden", 5);
        hidden.is_hidden = true;
        let mut future = resource("Future", 5);
        future.live_date = Some(now + Duration::hours(2));
        let mut past = resource("Past", 0);
        past.live_date = Some(now - Duration::hours(2));

        let out = CatalogQuery::default().apply(vec![visible, hidden, future, past], now);
        let titles: Vec<_> = out.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Visible", "Past"]);
    }

    #[test]
    fn search_category_and_tags_combine() {
        let now = Utc::now();
        let mut a = resource("Budget Sheet", 3);
        a.tags = [Tag::Calculators, Tag::Families].into_iter().collect();
        let mut b = resource("Estate Checklist", 9);
        b.category = Category::Plans;
        b.tags = [Tag::EstatePlanning].into_iter().collect();
        let c = resource("Net Worth", 1);

        let q = CatalogQuery { search: Some("BUDGET".into()), ..Default::default() };
        assert_eq!(q.apply(vec![a.clone(), b.clone(), c.clone()], now).len(), 1);

        let q = CatalogQuery { category: Some(Category::Plans), ..Default::default() };
        assert_eq!(q.apply(vec![a.clone(), b.clone(), c.clone()], now)[0].title, "Estate Checklist");

        let q = CatalogQuery { tags: [Tag::Calculators, Tag::Families].into_iter().collect(), ..Default::default() };
        assert_eq!(q.apply(vec![a.clone(), b.clone(), c.clone()], now).len(), 1);
        let q = CatalogQuery { tags: [Tag::Calculators, Tag::Single].into_iter().collect(), ..Default::default() };
        assert!(q.apply(vec![a.clone(), b.clone(), c.clone()], now).is_empty());

        let all = CatalogQuery::default().apply(vec![c, a, b], now);
        let counts: Vec<u64> = all.iter().map(|r| r.download_count).collect();
        assert_eq!(counts, vec![9, 3, 1]);
    }
}
