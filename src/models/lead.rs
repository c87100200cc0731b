use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::timestamp;
use crate::error::{Result, StrikeError};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

// ─── Stage ───────────────────────────────────────────────────────────────────

/// Pipeline stage. Wire value is the display label. Values outside the five
/// known stages are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeadStage {
    NewLeads,
    Contacted,
    FollowUp,
    Negotiation,
    Closed,
    Other(String),
}

impl LeadStage {
    /// The five known stages in pipeline order.
    pub const PIPELINE: [LeadStage; 5] = [
        LeadStage::NewLeads,
        LeadStage::Contacted,
        LeadStage::FollowUp,
        LeadStage::Negotiation,
        LeadStage::Closed,
    ];

    pub fn label(&self) -> &str {
        match self {
            LeadStage::NewLeads => "New Leads",
            LeadStage::Contacted => "Contacted",
            LeadStage::FollowUp => "Follow-up",
            LeadStage::Negotiation => "Negotiation",
            LeadStage::Closed => "Closed",
            LeadStage::Other(raw) => raw,
        }
    }

    /// Position in the pipeline, `None` for unknown stages.
    pub fn position(&self) -> Option<usize> {
        Self::PIPELINE.iter().position(|s| s == self)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, LeadStage::Other(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LeadStage::Closed)
    }
}

impl From<String> for LeadStage {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "New Leads" => LeadStage::NewLeads,
            "Contacted" => LeadStage::Contacted,
            "Follow-up" => LeadStage::FollowUp,
            "Negotiation" => LeadStage::Negotiation,
            "Closed" => LeadStage::Closed,
            _ => LeadStage::Other(raw),
        }
    }
}

impl From<&str> for LeadStage {
    fn from(raw: &str) -> Self {
        LeadStage::from(raw.to_string())
    }
}

impl From<LeadStage> for String {
    fn from(stage: LeadStage) -> Self {
        match stage {
            LeadStage::Other(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for LeadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Priority ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
    Other(String),
}

impl Priority {
    /// high=3, medium=2, low=1, anything else 0.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
            Priority::Other(_) => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Other(raw) => raw,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl From<String> for Priority {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            _ => Priority::Other(raw),
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStatus {
    Won,
    Lost,
}

// ─── Lead ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub stage: LeadStage,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub order_value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub deal_status: Option<DealStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, alias = "user_id")]
    pub owner_id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub last_interaction: Option<DateTime<Utc>>,
}

/// Body of `POST /api/leads`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<LeadStage>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

impl LeadDraft {
    /// Presence checks only; everything else is the backend's call.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(StrikeError::Invalid("Name is required".to_string()));
        }
        let phone = present(&self.phone);
        let email = present(&self.email);
        if phone.is_none() && email.is_none() {
            return Err(StrikeError::Invalid(
                "Please provide at least a phone number or email".to_string(),
            ));
        }
        if let Some(email) = email {
            if !is_email(email) {
                return Err(StrikeError::Invalid(format!("'{}' is not a valid email", email)));
            }
        }
        Ok(())
    }

    /// Local stand-in shown until the server answers.
    pub fn placeholder(&self, id: String, now: DateTime<Utc>) -> Lead {
        Lead {
            id,
            name: self.name.trim().to_string(),
            company: self.company.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            stage: self.stage.clone().unwrap_or(LeadStage::NewLeads),
            priority: self.priority.clone(),
            order_value: self.order_value,
            currency: self.currency.clone(),
            deal_status: None,
            notes: self.notes.clone(),
            owner_id: String::new(),
            created_at: now,
            last_interaction: None,
        }
    }
}

/// Body of `PUT /api/leads/{id}`. The backend overwrites every field with
/// what it receives, so the whole lead is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadUpdate {
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub stage: LeadStage,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_status: Option<DealStatus>,
    pub notes: Option<String>,
}

impl From<&Lead> for LeadUpdate {
    fn from(lead: &Lead) -> Self {
        Self {
            name: lead.name.clone(),
            company: lead.company.clone(),
            phone: lead.phone.clone(),
            email: lead.email.clone(),
            address: lead.address.clone(),
            stage: lead.stage.clone(),
            priority: lead.priority.clone(),
            order_value: lead.order_value,
            currency: lead.currency.clone(),
            deal_status: lead.deal_status,
            notes: lead.notes.clone(),
        }
    }
}

/// A partial edit. Applied to the local record; the request itself carries
/// the full [`LeadUpdate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<LeadStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_status: Option<DealStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LeadPatch {
    pub fn is_empty(&self) -> bool {
        *self == LeadPatch::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(StrikeError::Invalid("Name is required".to_string()));
            }
        }
        if let Some(email) = present(&self.email) {
            if !is_email(email) {
                return Err(StrikeError::Invalid(format!("'{}' is not a valid email", email)));
            }
        }
        Ok(())
    }

    pub fn apply(&self, lead: &mut Lead) {
        if let Some(v) = &self.name {
            lead.name = v.clone();
        }
        if let Some(v) = &self.company {
            lead.company = Some(v.clone());
        }
        if let Some(v) = &self.phone {
            lead.phone = Some(v.clone());
        }
        if let Some(v) = &self.email {
            lead.email = Some(v.clone());
        }
        if let Some(v) = &self.address {
            lead.address = Some(v.clone());
        }
        if let Some(v) = &self.stage {
            lead.stage = v.clone();
        }
        if let Some(v) = &self.priority {
            lead.priority = v.clone();
        }
        if let Some(v) = self.order_value {
            lead.order_value = Some(v);
        }
        if let Some(v) = &self.currency {
            lead.currency = Some(v.clone());
        }
        if let Some(v) = self.deal_status {
            lead.deal_status = Some(v);
        }
        if let Some(v) = &self.notes {
            lead.notes = Some(v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_wire_values_round_trip() {
        let stage: LeadStage = serde_json::from_str("\"Follow-up\"").unwrap();
        assert_eq!(stage, LeadStage::FollowUp);
        assert_eq!(serde_json::to_string(&stage).unwrap(), "\"Follow-up\"");

        let odd: LeadStage = serde_json::from_str("\"Archived\"").unwrap();
        assert_eq!(odd, LeadStage::Other("Archived".to_string()));
        assert!(!odd.is_known());
        assert_eq!(serde_json::to_string(&odd).unwrap(), "\"Archived\"");
    }

    #[test]
    fn pipeline_order() {
        assert_eq!(LeadStage::NewLeads.position(), Some(0));
        assert_eq!(LeadStage::Closed.position(), Some(4));
        assert_eq!(LeadStage::from("Lost").position(), None);
    }

    #[test]
    fn priority_ranks() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
        assert_eq!(Priority::from("urgent".to_string()).rank(), 0);
    }

    #[test]
    fn lead_parses_backend_payload() {
        let lead: Lead = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "name": "Amy",
            "company": "Acme",
            "phone": "555-0100",
            "stage": "New Leads",
            "priority": "high",
            "order_value": 1200.5,
            "currency": "USD",
            "user_id": "u1",
            "created_at": "2024-05-01T09:00:00.000000",
            "last_interaction": null
        }))
        .unwrap();
        assert_eq!(lead.stage, LeadStage::NewLeads);
        assert_eq!(lead.priority, Priority::High);
        assert_eq!(lead.owner_id, "u1");
        assert!(lead.email.is_none());
        assert!(lead.last_interaction.is_none());
    }

    #[test]
    fn draft_needs_phone_or_email() {
        let mut draft = LeadDraft {
            name: "Amy".to_string(),
            ..Default::default()
        };
        assert!(matches!(draft.validate(), Err(StrikeError::Invalid(_))));

        draft.phone = Some("  ".to_string());
        assert!(draft.validate().is_err());

        draft.email = Some("amy@example.com".to_string());
        assert!(draft.validate().is_ok());

        draft.email = Some("amy-at-example".to_string());
        assert!(draft.validate().is_err());
    }

    #[test]
    fn draft_needs_name() {
        let draft = LeadDraft {
            name: " ".to_string(),
            phone: Some("555".to_string()),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn patch_touches_only_given_fields() {
        let draft = LeadDraft {
            name: "Amy".to_string(),
            phone: Some("555".to_string()),
            ..Default::default()
        };
        let mut lead = draft.placeholder("x".to_string(), Utc::now());
        let patch = LeadPatch {
            deal_status: Some(DealStatus::Won),
            notes: Some("signed".to_string()),
            ..Default::default()
        };
        patch.apply(&mut lead);
        assert_eq!(lead.deal_status, Some(DealStatus::Won));
        assert_eq!(lead.notes.as_deref(), Some("signed"));
        assert_eq!(lead.name, "Amy");
        assert_eq!(lead.phone.as_deref(), Some("555"));
        assert!(!patch.is_empty());
        assert!(LeadPatch::default().is_empty());
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = LeadPatch {
            stage: Some(LeadStage::Closed),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({ "stage": "Closed" })
        );
    }

    #[test]
    fn update_body_carries_the_whole_lead() {
        let lead: Lead = serde_json::from_value(serde_json::json!({
            "id": "xyz",
            "name": "Zoe",
            "phone": "555-0100",
            "stage": "Closed",
            "priority": "high",
            "notes": "met at expo",
            "user_id": "u1",
            "created_at": "2024-05-01T09:00:00Z"
        }))
        .unwrap();
        let mut next = lead.clone();
        LeadPatch {
            deal_status: Some(DealStatus::Won),
            ..Default::default()
        }
        .apply(&mut next);

        let body = serde_json::to_value(LeadUpdate::from(&next)).unwrap();
        assert_eq!(body["name"], "Zoe");
        assert_eq!(body["stage"], "Closed");
        assert_eq!(body["priority"], "high");
        assert_eq!(body["phone"], "555-0100");
        assert_eq!(body["notes"], "met at expo");
        assert_eq!(body["deal_status"], "won");
        assert!(body["email"].is_null());
        assert!(body.get("id").is_none());
    }
}
