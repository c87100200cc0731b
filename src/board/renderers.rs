use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{format, CardRenderer};
use crate::models::{DealStatus, Lead, Priority};

/// Name, company and a priority badge.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactCard;

#[derive(Debug, Clone, Serialize)]
pub struct CompactView {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub priority: Priority,
}

impl CardRenderer for CompactCard {
    type Card = CompactView;

    fn render(&self, lead: &Lead) -> CompactView {
        CompactView {
            id: lead.id.clone(),
            name: lead.name.clone(),
            company: lead.company.clone(),
            priority: lead.priority.clone(),
        }
    }
}

/// Everything on the compact card plus contact details, deal value and
/// how long ago the lead was last touched.
#[derive(Debug, Clone)]
pub struct DetailCard {
    currency: String,
    now: DateTime<Utc>,
}

impl DetailCard {
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self::at(default_currency, Utc::now())
    }

    /// Renders relative times against a fixed clock.
    pub fn at(default_currency: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            currency: default_currency.into(),
            now,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub priority: Priority,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub value_label: Option<String>,
    pub deal_status: Option<DealStatus>,
    pub last_interaction: Option<String>,
}

impl CardRenderer for DetailCard {
    type Card = DetailView;

    fn render(&self, lead: &Lead) -> DetailView {
        let currency = lead.currency.as_deref().unwrap_or(&self.currency);
        DetailView {
            id: lead.id.clone(),
            name: lead.name.clone(),
            company: lead.company.clone(),
            priority: lead.priority.clone(),
            phone: lead.phone.clone(),
            email: lead.email.clone(),
            value_label: lead.order_value.map(|v| format::money(v, currency)),
            deal_status: lead.deal_status,
            last_interaction: lead
                .last_interaction
                .map(|at| format::relative(at, self.now)),
        }
    }
}
