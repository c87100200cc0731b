use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::activity::Activity;

/// Server-computed aggregate behind `GET /api/dashboard/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_leads: u64,
    /// Stage label -> lead count.
    #[serde(default)]
    pub leads_by_stage: BTreeMap<String, u64>,
    /// Calls logged in the last seven days.
    #[serde(default, alias = "calls_this_week")]
    pub this_week_calls: u64,
    #[serde(default, alias = "emails_this_week")]
    pub this_week_emails: u64,
    #[serde(default)]
    pub pending_tasks: u64,
    #[serde(default)]
    pub overdue_tasks: u64,
    #[serde(default)]
    pub pipeline_value: f64,
    #[serde(default)]
    pub recent_activities: Vec<Activity>,
}

impl DashboardStats {
    pub fn count_for(&self, stage: &str) -> u64 {
        self.leads_by_stage.get(stage).copied().unwrap_or(0)
    }
}
