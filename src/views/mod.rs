//! Derived, read-only views. Nothing here talks to the backend.

pub mod leads;
pub mod tasks;

pub use leads::{
    aggregate_value, filter_leads, group_by_stage, sort_leads, stage_counts, ungrouped,
    LeadFilter, LeadQuery, SearchField, SortKey, StageBucket,
};
pub use tasks::{overdue_tasks, tasks_for_lead, tasks_with_status};
