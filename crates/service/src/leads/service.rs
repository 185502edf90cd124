use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{Lead, LeadInput};
use super::export::{export_signups, CsvExport};
use super::repository::LeadRepository;
use crate::catalog::{CatalogService, Resource};
use crate::errors::ServiceError;
use crate::metrics::LEADS_RECORDED_TOTAL;

/// Lead capture: validate, append, then bump the resource counter.
#[derive(Clone)]
pub struct LeadService {
    repo: Arc<dyn LeadRepository>,
    catalog: CatalogService,
}

impl LeadService {
    pub fn new(repo: Arc<dyn LeadRepository>, catalog: CatalogService) -> Self {
        Self { repo, catalog }
    }

    /// Record a lead for a resource.
    ///
    /// Nothing is written unless consent was given and the email and first
    /// name are valid. The counter increment runs after the append and never
    /// fails the call.
    #[instrument(skip(self, input), fields(resource_id = %resource_id))]
    pub async fn create(&self, resource_id: &str, resource_title: &str, input: LeadInput) -> Result<Lead, ServiceError> {
        if !input.has_consented {
            return Err(ServiceError::Validation("consent is required to download".into()));
        }
        models::lead::validate_email(&input.email)?;
        models::lead::validate_first_name(&input.first_name)?;

        let lead = Lead {
            id: Uuid::new_v4().to_string(),
            first_name: input.first_name.trim().to_string(),
            email: input.email.trim().to_string(),
            resource_id: resource_id.to_string(),
            resource_title: resource_title.to_string(),
            timestamp: Utc::now(),
            has_consented: true,
        };
        let lead = self.repo.append(lead).await?;
        LEADS_RECORDED_TOTAL.inc();
        info!(lead_id = %lead.id, resource_id = %lead.resource_id, "lead_recorded");

        self.catalog.increment_download_count(resource_id).await;
        Ok(lead)
    }

    pub async fn list(&self) -> Result<Vec<Lead>, ServiceError> {
        self.repo.list().await
    }

    /// Signups for one resource as CSV; `None` when there are none.
    pub async fn export_csv(&self, resource: &Resource) -> Result<Option<CsvExport>, ServiceError> {
        let leads = self.repo.list_for_resource(&resource.id).await?;
        Ok(export_signups(&resource.title, &leads))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;
    use crate::catalog::JsonCatalogRepository;
    use crate::leads::repository::JsonLeadRepository;
    use crate::test_support::{new_resource, temp_data_dir};

    async fn setup() -> anyhow::Result<(LeadService, CatalogService, std::path::PathBuf)> {
        let dir = temp_data_dir();
        let catalog = CatalogService::new(
            Arc::new(JsonCatalogRepository::open(&dir).await?),
            Arc::new(MemoryBlobStore::default()),
        );
        let leads = LeadService::new(Arc::new(JsonLeadRepository::open(&dir).await?), catalog.clone());
        Ok((leads, catalog, dir))
    }

    fn input(first_name: &str, email: &str, consent: bool) -> LeadInput {
        LeadInput { first_name: first_name.into(), email: email.into(), has_consented: consent }
    }

    #[tokio::test]
    async fn consented_lead_is_stored_and_counted() -> anyhow::Result<()> {
        let (leads, catalog, dir) = setup().await?;
        let r = catalog.create(new_resource("Budget Sheet"), None, None).await?;

        let lead = leads.create(&r.id, &r.title, input(" Jo ", " jo@example.com ", true)).await?;
        assert_eq!(lead.first_name, "Jo");
        assert_eq!(lead.email, "jo@example.com");
        assert!(lead.has_consented);
        assert_eq!(leads.list().await?, vec![lead]);
        assert_eq!(catalog.get(&r.id).await?.map(|r| r.download_count), Some(1));

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_creates_nothing() -> anyhow::Result<()> {
        let (leads, catalog, dir) = setup().await?;
        let r = catalog.create(new_resource("Budget Sheet"), None, None).await?;

        let err = leads.create(&r.id, &r.title, input("Jo", "jo@example.com", false)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        for email in ["not-an-email", ""] {
            let err = leads.create(&r.id, &r.title, input("Jo", email, true)).await.unwrap_err();
            assert!(err.is_validation());
        }
        let err = leads.create(&r.id, &r.title, input("  ", "jo@example.com", true)).await.unwrap_err();
        assert!(err.is_validation());

        assert!(leads.list().await?.is_empty());
        assert_eq!(catalog.get(&r.id).await?.map(|r| r.download_count), Some(0));

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn lead_survives_missing_resource() -> anyhow::Result<()> {
        let (leads, _catalog, dir) = setup().await?;
        // counter update fails quietly; the lead is still kept
        let lead = leads.create("gone", "Old Title", input("Jo", "jo@example.com", true)).await?;
        assert_eq!(leads.list().await?.len(), 1);
        assert_eq!(lead.resource_title, "Old Title");

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn export_is_per_resource() -> anyhow::Result<()> {
        let (leads, catalog, dir) = setup().await?;
        let a = catalog.create(new_resource("Budget Sheet"), None, None).await?;
        let b = catalog.create(new_resource("Other"), None, None).await?;
        leads.create(&a.id, &a.title, input("Jo\"e", "joe@example.com", true)).await?;

        let csv = leads.export_csv(&a).await?.expect("one signup");
        assert_eq!(csv.filename, "signups_budget_sheet.csv");
        assert!(csv.content.starts_with("firstName,email,timestamp\n\"Jo\"\"e\""));
        assert!(leads.export_csv(&b).await?.is_none());

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
