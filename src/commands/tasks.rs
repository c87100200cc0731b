use chrono::Utc;
use tauri::State;

use crate::models::{Task, TaskDraft, TaskPatch, TaskStatus};
use crate::scope::ScopeRegistry;
use crate::store::TaskScope;
use crate::views::overdue_tasks;
use crate::CrmClient;

#[tauri::command]
pub async fn list_tasks(
    client: State<'_, CrmClient>,
    scopes: State<'_, ScopeRegistry>,
    scope: String,
    status: Option<TaskStatus>,
) -> Result<Vec<Task>, String> {
    let cancel = scopes.token(&scope);
    client
        .tasks()
        .fetch(status, &cancel)
        .await
        .map(|items| items.to_vec())
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn list_lead_tasks(
    client: State<'_, CrmClient>,
    scopes: State<'_, ScopeRegistry>,
    scope: String,
    lead_id: String,
) -> Result<Vec<Task>, String> {
    let cancel = scopes.token(&scope);
    client
        .tasks()
        .fetch_for_lead(&lead_id, &cancel)
        .await
        .map(|items| items.to_vec())
        .map_err(|e| e.to_string())
}

/// Overdue tasks from the cached full list.
#[tauri::command]
pub fn overdue(client: State<'_, CrmClient>) -> Vec<Task> {
    let snapshot = client.tasks().snapshot(&TaskScope::All(None));
    overdue_tasks(&snapshot.items, Utc::now())
        .into_iter()
        .cloned()
        .collect()
}

#[tauri::command]
pub async fn create_task(client: State<'_, CrmClient>, draft: TaskDraft) -> Result<Task, String> {
    client.tasks().create(draft).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_task(
    client: State<'_, CrmClient>,
    id: String,
    patch: TaskPatch,
) -> Result<Task, String> {
    client
        .tasks()
        .update(&id, patch)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn set_task_status(
    client: State<'_, CrmClient>,
    id: String,
    status: TaskStatus,
) -> Result<(), String> {
    client
        .tasks()
        .set_status(&id, status)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn delete_task(client: State<'_, CrmClient>, id: String) -> Result<(), String> {
    client.tasks().delete(&id).await.map_err(|e| e.to_string())
}
