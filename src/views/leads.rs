//! Pure views over the lead list: grouping, filtering, sorting, totals.
//! Recomputed from the current snapshot on every read.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::models::{Lead, LeadStage, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Name,
    Company,
    Phone,
    Email,
    Stage,
}

impl SearchField {
    pub const DEFAULT: [SearchField; 4] = [
        SearchField::Name,
        SearchField::Company,
        SearchField::Phone,
        SearchField::Email,
    ];

    fn value<'a>(&self, lead: &'a Lead) -> Option<&'a str> {
        match self {
            SearchField::Name => Some(&lead.name),
            SearchField::Company => lead.company.as_deref(),
            SearchField::Phone => lead.phone.as_deref(),
            SearchField::Email => lead.email.as_deref(),
            SearchField::Stage => Some(lead.stage.label()),
        }
    }
}

fn default_fields() -> Vec<SearchField> {
    SearchField::DEFAULT.to_vec()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadFilter {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_fields")]
    pub fields: Vec<SearchField>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl Default for LeadFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            fields: default_fields(),
            priority: None,
        }
    }
}

impl LeadFilter {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_fields(mut self, fields: &[SearchField]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(priority) = &self.priority {
            if &lead.priority != priority {
                return false;
            }
        }
        if self.query.is_empty() {
            return true;
        }
        // as typed; surrounding spaces are part of the query
        let needle = self.query.to_lowercase();
        self.fields.iter().any(|field| {
            field
                .value(lead)
                .is_some_and(|v| v.to_lowercase().contains(&needle))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Company,
    /// Lexicographic on the stage label, not pipeline order.
    Stage,
    /// high > medium > low > unknown.
    Priority,
    /// Most recently created first.
    Newest,
}

fn compare(a: &Lead, b: &Lead, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Company => {
            let a = a.company.as_deref().unwrap_or_default().to_lowercase();
            let b = b.company.as_deref().unwrap_or_default().to_lowercase();
            a.cmp(&b)
        }
        SortKey::Stage => a.stage.label().cmp(b.stage.label()),
        SortKey::Priority => b.priority.rank().cmp(&a.priority.rank()),
        SortKey::Newest => b.created_at.cmp(&a.created_at),
    }
}

/// Stable sort in place; works on owned leads and on references.
pub fn sort_leads<L: Borrow<Lead>>(leads: &mut [L], key: SortKey) {
    leads.sort_by(|a, b| compare(a.borrow(), b.borrow(), key));
}

pub fn filter_leads<'a>(leads: &'a [Lead], filter: &LeadFilter) -> Vec<&'a Lead> {
    leads.iter().filter(|lead| filter.matches(lead)).collect()
}

/// One pipeline column's worth of leads.
#[derive(Debug, Clone)]
pub struct StageBucket<'a> {
    pub stage: LeadStage,
    pub leads: Vec<&'a Lead>,
}

/// Partitions leads into the five pipeline stages, in pipeline order.
/// Leads whose stage is unknown land in no bucket; see [`ungrouped`].
pub fn group_by_stage<'a, I>(leads: I) -> Vec<StageBucket<'a>>
where
    I: IntoIterator<Item = &'a Lead>,
{
    let mut buckets: Vec<StageBucket<'a>> = LeadStage::PIPELINE
        .iter()
        .map(|stage| StageBucket {
            stage: stage.clone(),
            leads: Vec::new(),
        })
        .collect();
    for lead in leads {
        if let Some(pos) = lead.stage.position() {
            buckets[pos].leads.push(lead);
        }
    }
    buckets
}

pub fn ungrouped<'a, I>(leads: I) -> Vec<&'a Lead>
where
    I: IntoIterator<Item = &'a Lead>,
{
    leads.into_iter().filter(|l| !l.stage.is_known()).collect()
}

/// Sum of `order_value`; leads without one count as 0.
pub fn aggregate_value<'a, I>(leads: I) -> f64
where
    I: IntoIterator<Item = &'a Lead>,
{
    leads.into_iter().map(|l| l.order_value.unwrap_or(0.0)).sum()
}

pub fn stage_counts(leads: &[Lead]) -> Vec<(LeadStage, usize)> {
    group_by_stage(leads)
        .into_iter()
        .map(|bucket| (bucket.stage, bucket.leads.len()))
        .collect()
}

/// Filter then optionally sort: what a list screen shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadQuery {
    #[serde(default)]
    pub filter: LeadFilter,
    #[serde(default)]
    pub sort: Option<SortKey>,
}

impl LeadQuery {
    pub fn apply<'a>(&self, leads: &'a [Lead]) -> Vec<&'a Lead> {
        let mut out = filter_leads(leads, &self.filter);
        if let Some(key) = self.sort {
            sort_leads(&mut out, key);
        }
        out
    }
}
