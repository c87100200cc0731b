use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lead::Priority;
use super::timestamp;
use crate::error::{Result, StrikeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskType {
    Call,
    Email,
    Meeting,
    FollowUp,
    Other(String),
}

impl From<String> for TaskType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "call" => TaskType::Call,
            "email" => TaskType::Email,
            "meeting" => TaskType::Meeting,
            "follow_up" => TaskType::FollowUp,
            _ => TaskType::Other(raw),
        }
    }
}

impl From<TaskType> for String {
    fn from(kind: TaskType) -> Self {
        match kind {
            TaskType::Call => "call".to_string(),
            TaskType::Email => "email".to_string(),
            TaskType::Meeting => "meeting".to_string(),
            TaskType::FollowUp => "follow_up".to_string(),
            TaskType::Other(raw) => raw,
        }
    }
}

impl Default for TaskType {
    fn default() -> Self {
        TaskType::FollowUp
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub lead_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub task_type: TaskType,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "timestamp::option")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending && self.due_date.is_some_and(|due| due < now)
    }

    /// Moves the task to `status`, stamping or clearing `completed_at`.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        self.completed_at = match status {
            TaskStatus::Completed => Some(self.completed_at.unwrap_or(now)),
            _ => None,
        };
    }
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(StrikeError::Invalid("Task title is required".to_string()));
        }
        Ok(())
    }

    pub fn placeholder(&self, id: String, now: DateTime<Utc>) -> Task {
        Task {
            id,
            lead_id: self.lead_id.clone(),
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            task_type: self.task_type.clone(),
            status: TaskStatus::Pending,
            priority: self.priority.clone(),
            due_date: self.due_date,
            completed_at: None,
            created_at: now,
        }
    }
}

/// Body of `PUT /api/tasks/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn apply(&self, task: &mut Task) {
        if let Some(v) = &self.title {
            task.title = v.clone();
        }
        if let Some(v) = &self.description {
            task.description = Some(v.clone());
        }
        if let Some(v) = &self.task_type {
            task.task_type = v.clone();
        }
        if let Some(v) = &self.priority {
            task.priority = v.clone();
        }
        if let Some(v) = self.due_date {
            task.due_date = Some(v);
        }
    }
}
