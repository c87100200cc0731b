use serde::{Deserialize, Serialize};

use crate::error::{Result, StrikeError};

/// Visual template of a business card. Unknown identifiers are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CardTemplate {
    Professional,
    Classic,
    Modern,
    Minimal,
    Bold,
    Other(String),
}

impl CardTemplate {
    pub fn as_str(&self) -> &str {
        match self {
            CardTemplate::Professional => "professional",
            CardTemplate::Classic => "classic",
            CardTemplate::Modern => "modern",
            CardTemplate::Minimal => "minimal",
            CardTemplate::Bold => "bold",
            CardTemplate::Other(raw) => raw,
        }
    }
}

impl Default for CardTemplate {
    fn default() -> Self {
        CardTemplate::Professional
    }
}

impl From<String> for CardTemplate {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "professional" => CardTemplate::Professional,
            "classic" => CardTemplate::Classic,
            "modern" => CardTemplate::Modern,
            "minimal" => CardTemplate::Minimal,
            "bold" => CardTemplate::Bold,
            _ => CardTemplate::Other(raw),
        }
    }
}

impl From<CardTemplate> for String {
    fn from(template: CardTemplate) -> Self {
        match template {
            CardTemplate::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessCard {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(rename = "name", alias = "full_name")]
    pub full_name: String,
    #[serde(default, rename = "title", alias = "job_title")]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub template: CardTemplate,
    /// Server-rendered QR image, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

/// Body of `POST /api/business-card`; the backend upserts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardDraft {
    #[serde(rename = "name", alias = "full_name")]
    pub full_name: String,
    #[serde(
        default,
        rename = "title",
        alias = "job_title",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub template: CardTemplate,
}

impl CardDraft {
    /// Name, title, company, phone and email are all required by the backend.
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(StrikeError::Invalid("Full name is required".to_string()));
        }
        let required = [
            ("Job title", &self.job_title),
            ("Company", &self.company),
            ("Phone", &self.phone),
            ("Email", &self.email),
        ];
        for (label, value) in required {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                return Err(StrikeError::Invalid(format!("{} is required", label)));
            }
        }
        if let Some(email) = self.email.as_deref() {
            if !super::lead::is_email(email.trim()) {
                return Err(StrikeError::Invalid(format!("'{}' is not a valid email", email)));
            }
        }
        Ok(())
    }
}

impl From<&BusinessCard> for CardDraft {
    fn from(card: &BusinessCard) -> Self {
        Self {
            full_name: card.full_name.clone(),
            job_title: card.job_title.clone(),
            company: card.company.clone(),
            phone: card.phone.clone(),
            email: card.email.clone(),
            website: card.website.clone(),
            address: card.address.clone(),
            bio: card.bio.clone(),
            template: card.template.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CardDraft {
        CardDraft {
            full_name: "Amy Pond".to_string(),
            job_title: Some("CEO".to_string()),
            company: Some("Acme".to_string()),
            phone: Some("+1 555 0100".to_string()),
            email: Some("amy@acme.test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_backend_card_payload() {
        let card: BusinessCard = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "name": "Amy Pond",
            "title": "CEO",
            "company": "Acme",
            "phone": "+1 555 0100",
            "email": "amy@acme.test",
            "website": null,
            "template": "professional",
            "qr_code": null,
            "user_id": "u1",
            "created_at": "2024-05-01T09:00:00"
        }))
        .unwrap();
        assert_eq!(card.full_name, "Amy Pond");
        assert_eq!(card.job_title.as_deref(), Some("CEO"));
        assert_eq!(card.template, CardTemplate::Professional);
        assert_eq!(card.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn draft_uses_backend_field_names() {
        let body = serde_json::to_value(draft()).unwrap();
        assert_eq!(body["name"], "Amy Pond");
        assert_eq!(body["title"], "CEO");
        assert_eq!(body["template"], "professional");
        assert!(body.get("full_name").is_none());
        assert!(body.get("job_title").is_none());
    }

    #[test]
    fn draft_requires_backend_fields() {
        assert!(draft().validate().is_ok());

        let mut missing_title = draft();
        missing_title.job_title = None;
        let err = missing_title.validate().unwrap_err();
        assert_eq!(err.to_string(), "Job title is required");

        let mut blank_phone = draft();
        blank_phone.phone = Some("  ".to_string());
        assert!(blank_phone.validate().is_err());

        let mut bad_email = draft();
        bad_email.email = Some("amy at acme".to_string());
        assert!(bad_email.validate().is_err());
    }
}
