use reqwest::Method;
use tokio_util::sync::CancellationToken;

use super::Gateway;
use crate::error::Result;
use crate::models::{Task, TaskDraft, TaskPatch, TaskStatus};

impl Gateway {
    /// `GET /api/tasks`, optionally narrowed to one status.
    pub async fn list_tasks(
        &self,
        status: Option<TaskStatus>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Task>> {
        match status {
            Some(status) => {
                self.get_json("/api/tasks", &[("status", status.as_str())], cancel)
                    .await
            }
            None => self.get_json("/api/tasks", &[], cancel).await,
        }
    }

    pub async fn list_lead_tasks(
        &self,
        lead_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Task>> {
        self.get_json(&format!("/api/leads/{}/tasks", lead_id), &[], cancel)
            .await
    }

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        self.send_json(Method::POST, "/api/tasks", draft).await
    }

    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        self.send_json(Method::PUT, &format!("/api/tasks/{}", id), patch)
            .await
    }

    /// Same shape as the lead stage transition: the status is a query parameter.
    pub async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<()> {
        self.send_unit(
            Method::PATCH,
            &format!("/api/tasks/{}/status", id),
            &[("status", status.as_str())],
        )
        .await
    }

    pub async fn delete_task(&self, id: &str) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("/api/tasks/{}", id), &[])
            .await
    }
}
