//! Visitor download flow: lead capture, counters and subscriber passes.

pub mod pass;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::catalog::CatalogService;
use crate::errors::ServiceError;
use crate::leads::{Lead, LeadInput, LeadService};
pub use pass::{Subscriber, SubscriberPass, SubscriberPassIssuer};

/// How a visitor identifies when asking for a download.
#[derive(Debug, Clone)]
pub enum DownloadIdentity {
    /// Filled-in signup form.
    Form(LeadInput),
    /// Token of a previously issued [`SubscriberPass`].
    Subscriber(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadOutcome {
    pub lead: Lead,
    /// Link to follow, absent for coming-soon resources or resources without a file.
    pub download_url: Option<String>,
    pub subscriber_pass: SubscriberPass,
}

#[derive(Clone)]
pub struct DownloadService {
    catalog: CatalogService,
    leads: LeadService,
    passes: SubscriberPassIssuer,
}

impl DownloadService {
    pub fn new(catalog: CatalogService, leads: LeadService, passes: SubscriberPassIssuer) -> Self {
        Self { catalog, leads, passes }
    }

    /// Record a lead for a visible resource and hand back its link.
    ///
    /// Returns `Ok(None)` without writing anything when the resource does not
    /// exist or is not visible at `now`.
    #[instrument(skip(self, identity), fields(resource_id = %resource_id))]
    pub async fn submit(
        &self,
        resource_id: &str,
        identity: DownloadIdentity,
        now: DateTime<Utc>,
    ) -> Result<Option<DownloadOutcome>, ServiceError> {
        let Some(resource) = self.catalog.get_public(resource_id, now).await? else {
            debug!("download requested for unavailable resource");
            return Ok(None);
        };

        let input = match identity {
            DownloadIdentity::Form(input) => input,
            DownloadIdentity::Subscriber(token) => {
                let who = self.passes.verify(&token)?;
                LeadInput { first_name: who.first_name, email: who.email, has_consented: true }
            }
        };

        let lead = self.leads.create(&resource.id, &resource.title, input).await?;
        let subscriber_pass = self.passes.issue(&lead.email, Some(&lead.first_name))?;
        let download_url = resource.download_link().map(str::to_string);
        info!(lead_id = %lead.id, has_link = download_url.is_some(), "download_submitted");
        Ok(Some(DownloadOutcome { lead, download_url, subscriber_pass }))
    }

    /// Count an access that bypasses the form (e.g. an external link).
    /// Returns whether the resource was visible and counted.
    #[instrument(skip(self), fields(resource_id = %resource_id))]
    pub async fn record_external_access(&self, resource_id: &str, now: DateTime<Utc>) -> Result<bool, ServiceError> {
        if self.catalog.get_public(resource_id, now).await?.is_none() {
            return Ok(false);
        }
        self.catalog.increment_download_count(resource_id).await;
        Ok(true)
    }

    pub fn issue_pass(&self, email: &str) -> Result<SubscriberPass, ServiceError> {
        Ok(self.passes.issue_for_email(email)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::MemoryBlobStore;
    use crate::catalog::JsonCatalogRepository;
    use crate::leads::JsonLeadRepository;
    use crate::test_support::{new_resource, temp_data_dir};
    use chrono::Duration;
    use std::sync::Arc;

    struct Fixture {
        downloads: DownloadService,
        catalog: CatalogService,
        leads: LeadService,
        dir: std::path::PathBuf,
    }

    async fn fixture() -> anyhow::Result<Fixture> {
        let dir = temp_data_dir();
        let catalog = CatalogService::new(
            Arc::new(JsonCatalogRepository::open(&dir).await?),
            Arc::new(MemoryBlobStore::default()),
        );
        let leads = LeadService::new(Arc::new(JsonLeadRepository::open(&dir).await?), catalog.clone());
        let passes = SubscriberPassIssuer::new("test-secret-0123456789", Duration::days(30));
        let downloads = DownloadService::new(catalog.clone(), leads.clone(), passes);
        Ok(Fixture { downloads, catalog, leads, dir })
    }

    fn form(first_name: &str, email: &str) -> DownloadIdentity {
        DownloadIdentity::Form(LeadInput { first_name: first_name.into(), email: email.into(), has_consented: true })
    }

    #[tokio::test]
    async fn form_submission_records_lead_and_returns_link() -> anyhow::Result<()> {
        let f = fixture().await?;
        let mut input = new_resource("Budget Sheet");
        input.file_url = "https://drive.example.com/budget".into();
        let r = f.catalog.create(input, None, None).await?;

        let out = f.downloads.submit(&r.id, form("Jo", "jo@example.com"), Utc::now()).await?.expect("visible");
        assert_eq!(out.download_url.as_deref(), Some("https://drive.example.com/budget"));
        assert_eq!(out.lead.resource_title, "Budget Sheet");
        assert_eq!(out.subscriber_pass.email, "jo@example.com");
        assert_eq!(f.catalog.get(&r.id).await?.map(|r| r.download_count), Some(1));

        // returning visitor with the pass
        let again = f
            .downloads
            .submit(&r.id, DownloadIdentity::Subscriber(out.subscriber_pass.token), Utc::now())
            .await?
            .expect("visible");
        assert_eq!(again.lead.first_name, "Jo");
        assert!(again.lead.has_consented);
        assert_eq!(f.leads.list().await?.len(), 2);

        let _ = tokio::fs::remove_dir_all(&f.dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn unavailable_resources_are_a_noop() -> anyhow::Result<()> {
        let f = fixture().await?;
        let mut hidden = new_resource("Hidden");
        hidden.is_hidden = true;
        let hidden = f.catalog.create(hidden, None, None).await?;
        let mut later = new_resource("Later");
        later.live_date = Some(Utc::now() + Duration::days(1));
        let later = f.catalog.create(later, None, None).await?;

        for id in [hidden.id.as_str(), later.id.as_str(), "missing"] {
            assert!(f.downloads.submit(id, form("Jo", "jo@example.com"), Utc::now()).await?.is_none());
            assert!(!f.downloads.record_external_access(id, Utc::now()).await?);
        }
        assert!(f.leads.list().await?.is_empty());

        let _ = tokio::fs::remove_dir_all(&f.dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn coming_soon_gives_no_link_and_email_pass_uses_default_name() -> anyhow::Result<()> {
        let f = fixture().await?;
        let mut soon = new_resource("Soon");
        soon.is_coming_soon = true;
        soon.file_url = "https://drive.example.com/soon".into();
        let soon = f.catalog.create(soon, None, None).await?;

        let pass = f.downloads.issue_pass("news@example.com")?;
        let out = f
            .downloads
            .submit(&soon.id, DownloadIdentity::Subscriber(pass.token), Utc::now())
            .await?
            .expect("visible");
        assert!(out.download_url.is_none());
        assert_eq!(out.lead.first_name, "Subscriber");

        let bad = f.downloads.submit(&soon.id, DownloadIdentity::Subscriber("forged".into()), Utc::now()).await;
        assert!(matches!(bad, Err(ServiceError::Auth(_))));

        let _ = tokio::fs::remove_dir_all(&f.dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn external_access_counts_without_lead() -> anyhow::Result<()> {
        let f = fixture().await?;
        let r = f.catalog.create(new_resource("Drive Link"), None, None).await?;
        assert!(f.downloads.record_external_access(&r.id, Utc::now()).await?);
        assert_eq!(f.catalog.get(&r.id).await?.map(|r| r.download_count), Some(1));
        assert!(f.leads.list().await?.is_empty());
        let _ = tokio::fs::remove_dir_all(&f.dir).await;
        Ok(())
    }
}
