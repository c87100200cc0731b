use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::collection::{Collection, MutationId, Snapshot};
use super::dashboard::DashboardStore;
use super::leads::{is_placeholder, PLACEHOLDER_PREFIX};
use crate::error::{Result, StrikeError};
use crate::gateway::Gateway;
use crate::models::{Task, TaskDraft, TaskPatch, TaskStatus};

/// Which server listing a cached task list mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskScope {
    All(Option<TaskStatus>),
    Lead(String),
}

impl TaskScope {
    /// Whether a brand-new task belongs in this listing.
    fn admits(&self, task: &Task) -> bool {
        match self {
            TaskScope::All(None) => true,
            TaskScope::All(Some(status)) => task.status == *status,
            TaskScope::Lead(id) => task.lead_id.as_deref() == Some(id.as_str()),
        }
    }
}

type Applied = Vec<(Arc<Collection<Task>>, MutationId)>;

/// Task lists keyed by scope. A mutation is applied to every cached list
/// holding the task; membership of status-filtered lists is only
/// recomputed on the next fetch.
#[derive(Clone)]
pub struct TaskStore {
    gateway: Gateway,
    dashboard: DashboardStore,
    lists: Arc<Mutex<HashMap<TaskScope, Arc<Collection<Task>>>>>,
}

impl TaskStore {
    pub fn new(gateway: Gateway, dashboard: DashboardStore) -> Self {
        Self {
            gateway,
            dashboard,
            lists: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn list(&self, scope: &TaskScope) -> Arc<Collection<Task>> {
        self.lists
            .lock()
            .entry(scope.clone())
            .or_insert_with(|| Arc::new(Collection::new()))
            .clone()
    }

    pub fn snapshot(&self, scope: &TaskScope) -> Snapshot<Task> {
        self.list(scope).snapshot()
    }

    fn cached(&self) -> Vec<(TaskScope, Arc<Collection<Task>>)> {
        self.lists
            .lock()
            .iter()
            .map(|(scope, list)| (scope.clone(), list.clone()))
            .collect()
    }

    pub async fn fetch(
        &self,
        status: Option<TaskStatus>,
        cancel: &CancellationToken,
    ) -> Result<Arc<Vec<Task>>> {
        let tasks = self.gateway.list_tasks(status, cancel).await?;
        let list = self.list(&TaskScope::All(status));
        list.replace_all(tasks);
        Ok(list.items())
    }

    pub async fn fetch_for_lead(
        &self,
        lead_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<Vec<Task>>> {
        let tasks = self.gateway.list_lead_tasks(lead_id, cancel).await?;
        let list = self.list(&TaskScope::Lead(lead_id.to_string()));
        list.replace_all(tasks);
        Ok(list.items())
    }

    pub async fn create(&self, draft: TaskDraft) -> Result<Task> {
        draft.validate()?;
        let placeholder = draft.placeholder(
            format!("{}{}", PLACEHOLDER_PREFIX, Uuid::new_v4()),
            Utc::now(),
        );
        let applied: Applied = self
            .cached()
            .into_iter()
            .filter(|(scope, _)| scope.admits(&placeholder))
            .map(|(_, list)| {
                let id = list.apply_insert(placeholder.clone());
                (list, id)
            })
            .collect();

        let result = self.gateway.create_task(&draft).await;
        self.settle(applied, result, |task| Some(task.clone()))
    }

    pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        guard_placeholder(id)?;
        let applied = self.apply_everywhere(id, |task| patch.apply(task));
        let result = self.gateway.update_task(id, &patch).await;
        self.settle(applied, result, |task| Some(task.clone()))
    }

    /// Completing stamps `completed_at`; any other status clears it.
    pub async fn set_status(&self, id: &str, status: TaskStatus) -> Result<()> {
        guard_placeholder(id)?;
        let now = Utc::now();
        let applied = self.apply_everywhere(id, |task| task.set_status(status, now));
        let result = self.gateway.update_task_status(id, status).await;
        self.settle(applied, result, |_| None)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        guard_placeholder(id)?;
        let applied: Applied = self
            .cached()
            .into_iter()
            .filter_map(|(_, list)| list.apply_remove(id).map(|m| (list, m)))
            .collect();
        let result = self.gateway.delete_task(id).await;
        self.settle(applied, result, |_| None)
    }

    fn apply_everywhere(&self, id: &str, f: impl Fn(&mut Task)) -> Applied {
        self.cached()
            .into_iter()
            .filter_map(|(_, list)| list.apply_update(id, |task| f(task)).map(|m| (list, m)))
            .collect()
    }

    fn settle<R>(
        &self,
        applied: Applied,
        result: Result<R>,
        replacement: impl Fn(&R) -> Option<Task>,
    ) -> Result<R> {
        match &result {
            Ok(value) => {
                for (list, id) in applied {
                    list.commit(id, replacement(value));
                }
                self.dashboard.invalidate();
            }
            Err(e) => {
                log::warn!("Task change failed, rolling back {} list(s): {}", applied.len(), e);
                for (list, id) in applied {
                    list.rollback(id);
                }
            }
        }
        result
    }

    pub fn clear(&self) {
        self.lists.lock().clear();
    }
}

fn guard_placeholder(id: &str) -> Result<()> {
    if is_placeholder(id) {
        return Err(StrikeError::Invalid(
            "This task is still being saved, try again in a moment".to_string(),
        ));
    }
    Ok(())
}
