use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::collection::{Collection, Snapshot};
use super::dashboard::DashboardStore;
use crate::error::{Result, StrikeError};
use crate::gateway::Gateway;
use crate::models::{Lead, LeadDraft, LeadPatch, LeadStage, LeadUpdate};

/// Id prefix of leads that exist only locally until the server answers.
pub const PLACEHOLDER_PREFIX: &str = "pending-";

pub fn is_placeholder(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_PREFIX)
}

/// The one shared lead list. Every screen reads and subscribes to the same
/// collection, so a mutation made anywhere is seen everywhere.
#[derive(Clone)]
pub struct LeadStore {
    gateway: Gateway,
    leads: Arc<Collection<Lead>>,
    dashboard: DashboardStore,
}

impl LeadStore {
    pub fn new(gateway: Gateway, dashboard: DashboardStore) -> Self {
        Self {
            gateway,
            leads: Arc::new(Collection::new()),
            dashboard,
        }
    }

    pub fn collection(&self) -> &Collection<Lead> {
        &self.leads
    }

    pub fn snapshot(&self) -> Snapshot<Lead> {
        self.leads.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Lead>> {
        self.leads.subscribe()
    }

    pub fn local(&self, id: &str) -> Option<Lead> {
        self.leads.get(id)
    }

    /// Replaces the whole local list with the server's.
    pub async fn fetch(&self, cancel: &CancellationToken) -> Result<Arc<Vec<Lead>>> {
        let leads = self.gateway.list_leads(cancel).await?;
        log::debug!("fetched {} leads", leads.len());
        self.leads.replace_all(leads);
        Ok(self.leads.items())
    }

    pub async fn get(&self, id: &str, cancel: &CancellationToken) -> Result<Lead> {
        let lead = self.gateway.get_lead(id, cancel).await?;
        self.leads.merge(lead.clone());
        Ok(lead)
    }

    /// Shows a placeholder right away and swaps in the server record (with
    /// its server-assigned id) once the POST succeeds.
    pub async fn create(&self, draft: LeadDraft) -> Result<Lead> {
        draft.validate()?;
        let temp_id = format!("{}{}", PLACEHOLDER_PREFIX, Uuid::new_v4());
        let mutation = self
            .leads
            .apply_insert(draft.placeholder(temp_id, Utc::now()));

        match self.gateway.create_lead(&draft).await {
            Ok(lead) => {
                self.leads.commit(mutation, Some(lead.clone()));
                self.dashboard.invalidate();
                log::info!("Created lead {}", lead.id);
                Ok(lead)
            }
            Err(e) => {
                log::warn!("Create lead failed, removing placeholder: {}", e);
                self.leads.rollback(mutation);
                Err(e)
            }
        }
    }

    /// Moves a lead to `stage` and stamps `last_interaction`. The local record
    /// changes immediately and is restored if the PATCH fails.
    pub async fn update_stage(&self, id: &str, stage: LeadStage) -> Result<()> {
        guard_placeholder(id)?;
        let now = Utc::now();
        let new_stage = stage.clone();
        let mutation = self.leads.apply_update(id, move |lead| {
            lead.stage = new_stage;
            lead.last_interaction = Some(now);
        });

        let result = self.gateway.update_lead_stage(id, &stage).await;
        match (result, mutation) {
            (Ok(()), Some(m)) => {
                self.leads.commit(m, None);
                self.dashboard.invalidate();
                log::info!("Lead {} moved to {}", id, stage);
                Ok(())
            }
            (Ok(()), None) => {
                self.dashboard.invalidate();
                Ok(())
            }
            (Err(e), Some(m)) => {
                log::warn!("Stage change for {} failed, rolling back: {}", id, e);
                self.leads.rollback(m);
                Err(e)
            }
            (Err(e), None) => Err(e),
        }
    }

    /// Applies `patch` locally, PUTs the whole patched lead and adopts the
    /// server's record. The lead must be in the cache, since the request
    /// body is built from it.
    pub async fn update(&self, id: &str, patch: LeadPatch) -> Result<Lead> {
        guard_placeholder(id)?;
        patch.validate()?;
        let mut next = self
            .local(id)
            .ok_or_else(|| StrikeError::NotFound(format!("lead {}", id)))?;
        if patch.is_empty() {
            return Ok(next);
        }
        patch.apply(&mut next);
        let body = LeadUpdate::from(&next);
        let mutation = self.leads.apply_update(id, move |lead| patch.apply(lead));

        match self.gateway.update_lead(id, &body).await {
            Ok(lead) => {
                match mutation {
                    Some(m) => {
                        self.leads.commit(m, Some(lead.clone()));
                    }
                    None => {
                        self.leads.merge(lead.clone());
                    }
                }
                self.dashboard.invalidate();
                Ok(lead)
            }
            Err(e) => {
                log::warn!("Update of lead {} failed, rolling back: {}", id, e);
                if let Some(m) = mutation {
                    self.leads.rollback(m);
                }
                Err(e)
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        guard_placeholder(id)?;
        let mutation = self.leads.apply_remove(id);
        match self.gateway.delete_lead(id).await {
            Ok(()) => {
                if let Some(m) = mutation {
                    self.leads.commit(m, None);
                }
                self.dashboard.invalidate();
                log::info!("Deleted lead {}", id);
                Ok(())
            }
            Err(e) => {
                log::warn!("Delete of lead {} failed, restoring: {}", id, e);
                if let Some(m) = mutation {
                    self.leads.rollback(m);
                }
                Err(e)
            }
        }
    }

    /// Local bookkeeping after an activity was logged against `id`.
    pub fn touch_interaction(&self, id: &str, at: DateTime<Utc>) {
        self.leads.modify_local(id, |lead| {
            if lead.last_interaction.map_or(true, |prev| prev < at) {
                lead.last_interaction = Some(at);
            }
        });
    }

    pub fn clear(&self) {
        self.leads.clear();
    }
}

fn guard_placeholder(id: &str) -> Result<()> {
    if is_placeholder(id) {
        return Err(StrikeError::Invalid(
            "This lead is still being saved, try again in a moment".to_string(),
        ));
    }
    Ok(())
}
