use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::collection::{Collection, Snapshot};
use super::dashboard::DashboardStore;
use super::leads::{is_placeholder, LeadStore, PLACEHOLDER_PREFIX};
use crate::error::{Result, StrikeError};
use crate::gateway::Gateway;
use crate::models::{Activity, ActivityDraft};

/// Activity timelines, one collection per lead.
#[derive(Clone)]
pub struct ActivityStore {
    gateway: Gateway,
    leads: LeadStore,
    dashboard: DashboardStore,
    timelines: Arc<Mutex<HashMap<String, Arc<Collection<Activity>>>>>,
}

impl ActivityStore {
    pub fn new(gateway: Gateway, leads: LeadStore, dashboard: DashboardStore) -> Self {
        Self {
            gateway,
            leads,
            dashboard,
            timelines: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn timeline(&self, lead_id: &str) -> Arc<Collection<Activity>> {
        self.timelines
            .lock()
            .entry(lead_id.to_string())
            .or_insert_with(|| Arc::new(Collection::new()))
            .clone()
    }

    pub fn snapshot(&self, lead_id: &str) -> Snapshot<Activity> {
        self.timeline(lead_id).snapshot()
    }

    pub async fn fetch(
        &self,
        lead_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<Vec<Activity>>> {
        let activities = self.gateway.list_activities(lead_id, cancel).await?;
        let timeline = self.timeline(lead_id);
        timeline.replace_all(activities);
        Ok(timeline.items())
    }

    /// Logs a call, email or note. Appears in the timeline immediately.
    pub async fn log(&self, draft: ActivityDraft) -> Result<Activity> {
        draft.validate()?;
        if is_placeholder(&draft.lead_id) {
            return Err(StrikeError::Invalid(
                "This lead is still being saved, try again in a moment".to_string(),
            ));
        }
        let timeline = self.timeline(&draft.lead_id);
        let temp_id = format!("{}{}", PLACEHOLDER_PREFIX, Uuid::new_v4());
        let mutation = timeline.apply_insert(draft.placeholder(temp_id, Utc::now()));

        match self.gateway.create_activity(&draft).await {
            Ok(activity) => {
                timeline.commit(mutation, Some(activity.clone()));
                self.leads
                    .touch_interaction(&activity.lead_id, activity.created_at);
                self.dashboard.invalidate();
                Ok(activity)
            }
            Err(e) => {
                log::warn!("Logging activity for {} failed: {}", draft.lead_id, e);
                timeline.rollback(mutation);
                Err(e)
            }
        }
    }

    pub fn forget(&self, lead_id: &str) {
        self.timelines.lock().remove(lead_id);
    }

    pub fn clear(&self) {
        self.timelines.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::test_support::{gateway_for, lead_json};
    use crate::models::ActivityType;

    #[tokio::test]
    async fn logged_activity_touches_lead() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/activities")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id": "a9", "lead_id": "abc", "activity_type": "email",
                    "content": "Sent brochure", "created_at": "2030-01-01T00:00:00Z"}"#,
            )
            .create_async()
            .await;
        let gateway = gateway_for(&server).await;
        let dashboard = DashboardStore::new(gateway.clone());
        let leads = LeadStore::new(gateway.clone(), dashboard.clone());
        leads
            .collection()
            .replace_all(vec![serde_json::from_value(lead_json("abc", "Amy", "Contacted")).unwrap()]);
        let store = ActivityStore::new(gateway, leads.clone(), dashboard);

        let activity = store
            .log(ActivityDraft {
                lead_id: "abc".to_string(),
                activity_type: ActivityType::Email,
                content: "Sent brochure".to_string(),
                outcome: None,
                duration: None,
            })
            .await
            .unwrap();

        let timeline = store.snapshot("abc");
        assert_eq!(timeline.items.len(), 1);
        assert_eq!(timeline.items[0].id, "a9");
        assert_eq!(
            leads.local("abc").unwrap().last_interaction,
            Some(activity.created_at)
        );
    }

    #[tokio::test]
    async fn failed_log_leaves_timeline_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/activities")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "Lead not found"}"#)
            .create_async()
            .await;
        let gateway = gateway_for(&server).await;
        let dashboard = DashboardStore::new(gateway.clone());
        let leads = LeadStore::new(gateway.clone(), dashboard.clone());
        let store = ActivityStore::new(gateway, leads, dashboard);

        let err = store
            .log(ActivityDraft {
                lead_id: "gone".to_string(),
                activity_type: ActivityType::Call,
                content: String::new(),
                outcome: Some("no answer".to_string()),
                duration: Some(0),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Lead not found");
        assert!(store.snapshot("gone").items.is_empty());
    }
}
