use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use super::domain::Lead;
use crate::errors::ServiceError;
use crate::storage::json_lines_log::JsonLinesLog;

/// Append-only lead storage. Listings are oldest first.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn append(&self, lead: Lead) -> Result<Lead, ServiceError>;
    async fn list(&self) -> Result<Vec<Lead>, ServiceError>;
    async fn list_for_resource(&self, resource_id: &str) -> Result<Vec<Lead>, ServiceError>;
}

/// Leads as one JSON object per line in `leads.jsonl`, so a signup appends
/// a single line instead of rewriting every earlier lead.
pub struct JsonLeadRepository {
    log: Arc<JsonLinesLog<Lead>>,
}

impl JsonLeadRepository {
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let log = JsonLinesLog::new(data_dir.into().join("leads.jsonl")).await?;
        Ok(Self { log })
    }
}

fn oldest_first(mut leads: Vec<Lead>) -> Vec<Lead> {
    leads.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
    leads
}

#[async_trait]
impl LeadRepository for JsonLeadRepository {
    async fn append(&self, lead: Lead) -> Result<Lead, ServiceError> {
        let id = lead.id.clone();
        self.log
            .append(lead, |existing| {
                if existing.iter().any(|l| l.id == id) {
                    return Err(ServiceError::Conflict(format!("lead {id} already exists")));
                }
                Ok(())
            })
            .await
    }

    async fn list(&self) -> Result<Vec<Lead>, ServiceError> {
        Ok(oldest_first(self.log.records().await))
    }

    async fn list_for_resource(&self, resource_id: &str) -> Result<Vec<Lead>, ServiceError> {
        let all = self.log.records().await;
        Ok(oldest_first(all.into_iter().filter(|l| l.resource_id == resource_id).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_data_dir;
    use chrono::{Duration, Utc};

    fn lead(id: &str, resource_id: &str, minutes_ago: i64) -> Lead {
        Lead {
            id: id.into(),
            first_name: "Jo".into(),
            email: "jo@example.com".into(),
            resource_id: resource_id.into(),
            resource_title: "Budget Sheet".into(),
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            has_consented: true,
        }
    }

    #[tokio::test]
    async fn each_append_adds_one_line() -> anyhow::Result<()> {
        let dir = temp_data_dir();
        let repo = JsonLeadRepository::open(&dir).await?;
        repo.append(lead("l1", "r1", 5)).await?;
        repo.append(lead("l2", "r2", 3)).await?;
        repo.append(lead("l3", "r1", 1)).await?;

        let raw = tokio::fs::read_to_string(dir.join("leads.jsonl")).await?;
        assert_eq!(raw.lines().count(), 3);
        assert!(raw.lines().next().is_some_and(|l| l.contains("\"l1\"")));

        assert!(matches!(repo.append(lead("l2", "r2", 0)).await, Err(ServiceError::Conflict(_))));
        assert_eq!(tokio::fs::read_to_string(dir.join("leads.jsonl")).await?.lines().count(), 3);

        let reopened = JsonLeadRepository::open(&dir).await?;
        let ids: Vec<String> = reopened.list().await?.into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["l1", "l2", "l3"]);
        let for_r1: Vec<String> = reopened.list_for_resource("r1").await?.into_iter().map(|l| l.id).collect();
        assert_eq!(for_r1, vec!["l1", "l3"]);

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
