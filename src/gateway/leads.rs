use reqwest::Method;
use tokio_util::sync::CancellationToken;

use super::Gateway;
use crate::error::Result;
use crate::models::{Lead, LeadDraft, LeadStage, LeadUpdate};

impl Gateway {
    pub async fn list_leads(&self, cancel: &CancellationToken) -> Result<Vec<Lead>> {
        self.get_json("/api/leads", &[], cancel).await
    }

    pub async fn get_lead(&self, id: &str, cancel: &CancellationToken) -> Result<Lead> {
        self.get_json(&format!("/api/leads/{}", id), &[], cancel).await
    }

    pub async fn create_lead(&self, draft: &LeadDraft) -> Result<Lead> {
        self.send_json(Method::POST, "/api/leads", draft).await
    }

    /// Full replace; fields left out of `lead` are reset server-side.
    pub async fn update_lead(&self, id: &str, lead: &LeadUpdate) -> Result<Lead> {
        self.send_json(Method::PUT, &format!("/api/leads/{}", id), lead)
            .await
    }

    /// The new stage travels as a query parameter, not in the body.
    pub async fn update_lead_stage(&self, id: &str, stage: &LeadStage) -> Result<()> {
        self.send_unit(
            Method::PATCH,
            &format!("/api/leads/{}/stage", id),
            &[("stage", stage.label())],
        )
        .await
    }

    pub async fn delete_lead(&self, id: &str) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("/api/leads/{}", id), &[])
            .await
    }
}
